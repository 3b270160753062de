use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info, warn, Level};

use vertical_reel::{
    audio::{AudioFitMode, AudioLoader},
    canvas::{
        collect_images, scan_images, BackgroundColor, CanvasSize, CropOffset, FitMode,
        FRONTEND_IMAGE_EXTENSIONS,
    },
    composition::{BuildRequest, CancelToken, Progress, ReelEngine},
    config::Config,
    motion::MotionMode,
    video::{ffmpeg_available, FfmpegEncoder},
};

#[derive(Parser)]
#[command(
    name = "vertical-reel",
    version,
    about = "Turn a folder of photos into a vertical video",
    long_about = "Vertical-Reel composites still images onto a 9:16 canvas, optionally \
                  animates them with Ken Burns pan/zoom and cross-fades, fits a soundtrack \
                  to the final length and encodes an MP4 with ffmpeg."
)]
struct Cli {
    /// Image files and/or folders (jpg, jpeg, png, webp)
    #[arg(short, long, required = true, num_args = 1..)]
    images: Vec<PathBuf>,

    /// Audio file (.mp3/.wav, also flac/ogg/m4a/aac)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Output video file path
    #[arg(short, long, default_value = "output/video.mp4")]
    out: PathBuf,

    /// Seconds per image [config default: 4.0]
    #[arg(long, alias = "duration", value_parser = parse_sec_per)]
    sec_per: Option<f64>,

    /// Total video length in seconds, takes priority over --sec-per
    #[arg(long, alias = "total", value_parser = parse_total)]
    total_duration: Option<f64>,

    /// Frames per second: 24, 30 or 60 [config default: 30]
    #[arg(long, value_parser = parse_fps)]
    fps: Option<u32>,

    /// Canvas width [config default: 1080]
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height [config default: 1920]
    #[arg(long)]
    height: Option<u32>,

    /// Letterbox color: black, white or #rrggbb [config default: black]
    #[arg(long)]
    bg: Option<BackgroundColor>,

    /// Fit the soundtrack to the video: trim or loop
    #[arg(long, default_value = "trim")]
    audio_adjust: AudioFitMode,

    /// Cross-fade between images
    #[arg(long)]
    transitions: bool,

    /// fit (letterboxed) or cover (cropped)
    #[arg(long, default_value = "cover")]
    fit_mode: FitMode,

    /// Blurred copy of the image as letterbox background (fit mode only)
    #[arg(long)]
    fancy_bg: bool,

    /// Motion: none, zoom or kenburns
    #[arg(long, default_value = "none")]
    motion: MotionMode,

    /// Crop offset for one image in cover mode, e.g. --crop photo.jpg=-0.5,0
    #[arg(long = "crop", value_parser = parse_crop)]
    crops: Vec<(PathBuf, CropOffset)>,

    /// Seed for reproducible motion
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a summary of inputs and parameters before rendering
    #[arg(long)]
    info: bool,

    /// Overwrite the output file without asking
    #[arg(short, long)]
    force: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_positive(s: &str, min: f64) -> std::result::Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(value >= min) {
        return Err(format!("must be at least {}", min));
    }
    Ok(value)
}

fn parse_sec_per(s: &str) -> std::result::Result<f64, String> {
    parse_positive(s, 0.05)
}

fn parse_total(s: &str) -> std::result::Result<f64, String> {
    parse_positive(s, 0.1)
}

fn parse_fps(s: &str) -> std::result::Result<u32, String> {
    match s.trim() {
        "24" => Ok(24),
        "30" => Ok(30),
        "60" => Ok(60),
        other => Err(format!("'{}' is not one of 24, 30, 60", other)),
    }
}

fn parse_crop(s: &str) -> std::result::Result<(PathBuf, CropOffset), String> {
    let (path, offset) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=OX,OY, got '{}'", s))?;
    let offset: CropOffset = offset.parse().map_err(|e: vertical_reel::ReelError| e.to_string())?;
    Ok((PathBuf::from(path), offset))
}

fn validate_audio(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Audio file not found: {}", path.display());
    }
    let supported = AudioLoader::detect_format(path)
        .map(|ext| AudioLoader::is_format_supported(&ext))
        .unwrap_or(false);
    if !supported {
        bail!("Unsupported audio format: {} (use .mp3 or .wav)", path.display());
    }
    Ok(())
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!("File already exists: {}. Overwrite? [y/N] ", path.display());
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_info(request: &BuildRequest, ffmpeg: &str) {
    let scanned = scan_images(&request.images);
    println!("🖼  Images: {}", request.images.len());
    let examples: Vec<String> = request
        .images
        .iter()
        .take(3)
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    println!("   Examples: {}", examples.join(", "));
    for info in scanned.iter().take(3) {
        println!("   {}x{} (aspect {:.2})", info.width, info.height, info.aspect());
    }
    if scanned.len() < request.images.len() {
        println!("   ⚠ {} file(s) could not be probed", request.images.len() - scanned.len());
    }
    if let Some(audio) = &request.audio {
        println!("🎵 Audio: {} ({})", audio.display(), request.audio_fit);
    }
    println!(
        "🎞  FPS: {} | size: {} | bg: {} | fit: {} | fancy_bg: {} | motion: {} | transitions: {}",
        request.fps,
        request.size,
        request.background,
        request.fit_mode,
        if request.fancy_background { "on" } else { "off" },
        request.motion,
        if request.transitions { "on" } else { "off" },
    );
    match request.total_duration {
        Some(total) => println!("⏱  total_duration: {:.2}s (sec_per is derived)", total),
        None => println!("⏱  sec_per: {:.2}s", request.sec_per),
    }
    let status = if ffmpeg_available(ffmpeg) { "found" } else { "NOT FOUND" };
    println!("🔧 ffmpeg ({}): {}", ffmpeg, status);
    println!();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Vertical-Reel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    let images = collect_images(&cli.images, FRONTEND_IMAGE_EXTENSIONS)?;
    if let Some(audio) = &cli.audio {
        validate_audio(audio)?;
    }

    let size = CanvasSize::new(
        cli.width.unwrap_or(config.output.width),
        cli.height.unwrap_or(config.output.height),
    );
    if size != CanvasSize::default() {
        warn!("⚠ {} is recommended for vertical videos (got {})", CanvasSize::default(), size);
    }
    if cli.fancy_bg && cli.fit_mode != FitMode::Fit {
        warn!("⚠ --fancy-bg only applies with --fit-mode fit (ignored in cover)");
    }

    if cli.out.exists() && !cli.force && !confirm_overwrite(&cli.out)? {
        bail!("Aborted: {} already exists", cli.out.display());
    }

    let mut request = BuildRequest::new(images, &cli.out, &config);
    request.sec_per = cli.sec_per.unwrap_or(config.output.sec_per);
    request.total_duration = cli.total_duration;
    request.fps = cli.fps.unwrap_or(config.output.fps);
    request.size = size;
    request.background = cli.bg.unwrap_or(config.output.background);
    request.audio = cli.audio.clone();
    request.transitions = cli.transitions;
    request.motion = cli.motion;
    request.audio_fit = cli.audio_adjust;
    request.fit_mode = cli.fit_mode;
    request.fancy_background = cli.fancy_bg;
    request.crop_offsets = cli.crops.iter().cloned().collect::<HashMap<_, _>>();
    request.seed = cli.seed;

    if cli.info {
        print_info(&request, &config.encoder.ffmpeg);
    }

    let mut encoder = FfmpegEncoder::new(&config.encoder);
    let engine = ReelEngine::new(config);

    let progress = |current: usize, total: usize| match Progress::from_counts(current, total) {
        Progress::Started => info!("Rendering {} images...", total),
        Progress::Frame(i) => info!("   [{}/{}]", i, total),
        Progress::Encoding => info!("Encoding..."),
    };

    let output = match engine.build(&request, &mut encoder, progress, &CancelToken::new()) {
        Ok(output) => output,
        Err(e) => {
            error!("{}", e.user_message());
            return Err(e.into());
        }
    };

    let size_mb = std::fs::metadata(&output)?.len() as f64 / (1024.0 * 1024.0);
    info!("✅ Done: {} ({:.1} MB)", output.display(), size_mb);
    Ok(())
}
