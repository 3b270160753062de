// Render one composited frame to PNG, for picking crop offsets before a full build

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use vertical_reel::{
    canvas::{Background, BackgroundColor, CanvasSize, Compositor, CropOffset, FitMode, FrameSpec},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "reel-preview",
    version,
    about = "Preview how one image lands on the vertical canvas"
)]
struct Cli {
    /// Source image
    image: PathBuf,

    /// Where to write the PNG preview
    #[arg(short, long, default_value = "preview.png")]
    out: PathBuf,

    /// fit (letterboxed) or cover (cropped)
    #[arg(long, default_value = "cover")]
    fit_mode: FitMode,

    /// Crop offset "ox,oy" in [-1, 1], cover mode only
    #[arg(long, allow_hyphen_values = true, default_value = "0,0")]
    offset: CropOffset,

    /// Letterbox color
    #[arg(long)]
    bg: Option<BackgroundColor>,

    /// Blurred copy of the image as letterbox background
    #[arg(long)]
    fancy_bg: bool,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let size = CanvasSize::new(
        cli.width.unwrap_or(config.output.width),
        cli.height.unwrap_or(config.output.height),
    );
    size.validate()?;

    let spec = FrameSpec {
        path: cli.image.clone(),
        index: 1,
        size,
        fit_mode: cli.fit_mode,
        background: Background::from_options(
            cli.bg.unwrap_or(config.output.background),
            cli.fancy_bg,
        ),
        offset: cli.offset,
        duration: config.output.sec_per,
    };

    let compositor = Compositor::new(&config.background);
    let frame = compositor.compose_file(&spec)?;
    frame.save_png(&cli.out)?;

    info!(
        "🖼  {} ({}, offset {:.2},{:.2}) -> {}",
        cli.image.display(),
        cli.fit_mode,
        cli.offset.x(),
        cli.offset.y(),
        cli.out.display()
    );
    Ok(())
}
