use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::audio::AudioFitMode;
use crate::canvas::{
    expand_build_inputs, Background, BackgroundColor, CanvasSize, CropOffset, FitMode, FrameSpec,
};
use crate::config::Config;
use crate::error::{ReelError, Result};
use crate::motion::MotionMode;
use crate::timing::DurationSpec;

/// Key under which a path is matched against crop offsets.
///
/// `./photos/a.png`, `photos/a.png` and an absolute spelling of the same file
/// all map to one key; paths that cannot be resolved are used as given.
fn match_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Parameters of one video build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Image files and/or directories, in order
    pub images: Vec<PathBuf>,
    pub output: PathBuf,
    /// Seconds per image, ignored when `total_duration` is set
    pub sec_per: f64,
    pub total_duration: Option<f64>,
    pub fps: u32,
    pub size: CanvasSize,
    pub background: BackgroundColor,
    pub audio: Option<PathBuf>,
    pub transitions: bool,
    pub motion: MotionMode,
    pub audio_fit: AudioFitMode,
    pub fit_mode: FitMode,
    /// Blurred self background for fit mode instead of the flat color
    pub fancy_background: bool,
    /// Per-image crop offsets for cover mode
    pub crop_offsets: HashMap<PathBuf, CropOffset>,
    /// Fixes the motion batch sequence
    pub seed: Option<u64>,
}

impl BuildRequest {
    /// Request with the configured output defaults
    pub fn new<P: Into<PathBuf>>(images: Vec<PathBuf>, output: P, config: &Config) -> Self {
        Self {
            images,
            output: output.into(),
            sec_per: config.output.sec_per,
            total_duration: None,
            fps: config.output.fps,
            size: config.output.size(),
            background: config.output.background,
            audio: None,
            transitions: false,
            motion: MotionMode::None,
            audio_fit: AudioFitMode::Trim,
            fit_mode: FitMode::Fit,
            fancy_background: true,
            crop_offsets: HashMap::new(),
            seed: None,
        }
    }

    /// Check every parameter before any frame work and resolve the timing.
    ///
    /// Fails with the first problem found: empty input, then fps, size,
    /// duration and audio path.
    pub fn validate(&self, config: &Config) -> Result<BuildPlan> {
        if self.images.is_empty() {
            return Err(ReelError::NoInputImages);
        }
        let images = expand_build_inputs(&self.images, &config.input.extensions)?;
        if images.is_empty() {
            return Err(ReelError::NoInputImages);
        }

        if self.fps == 0 {
            return Err(ReelError::invalid("fps", "must be > 0"));
        }
        self.size.validate()?;

        let duration = DurationSpec::from_options(self.sec_per, self.total_duration);
        duration.validate()?;

        if let Some(audio) = &self.audio {
            if !audio.exists() {
                return Err(ReelError::path_not_found(audio));
            }
        }

        let crop_offsets = self.resolve_crop_offsets(&images);

        let model = config.timing.fade_model();
        let sec_per = duration.resolve_sec_per(images.len(), self.transitions, &model)?;
        let fade = if self.transitions && images.len() > 1 {
            model.fade_for(sec_per)
        } else {
            0.0
        };

        let plan = BuildPlan {
            images,
            output: self.output.clone(),
            sec_per,
            fade,
            fps: self.fps,
            size: self.size,
            background: Background::from_options(self.background, self.fancy_background),
            audio: self.audio.clone(),
            motion: self.motion,
            audio_fit: self.audio_fit,
            fit_mode: self.fit_mode,
            crop_offsets,
            seed: self.seed,
        };
        debug!(
            "Build plan: {} images, sec_per {:.3}s, fade {:.3}s, {} {} @ {} fps",
            plan.images.len(),
            plan.sec_per,
            plan.fade,
            plan.fit_mode,
            plan.size,
            plan.fps
        );
        Ok(plan)
    }

    /// Re-key crop offsets by [`match_key`], dropping those that name no input image
    fn resolve_crop_offsets(&self, images: &[PathBuf]) -> HashMap<PathBuf, CropOffset> {
        let inputs: HashSet<PathBuf> = images.iter().map(|path| match_key(path)).collect();

        let mut resolved = HashMap::with_capacity(self.crop_offsets.len());
        for (path, offset) in &self.crop_offsets {
            let key = match_key(path);
            if inputs.contains(&key) {
                resolved.insert(key, *offset);
            } else {
                warn!("⚠ Crop offset for {} matches no input image (ignored)", path.display());
            }
        }
        resolved
    }
}

/// A validated build with timing resolved
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub images: Vec<PathBuf>,
    pub output: PathBuf,
    pub sec_per: f64,
    /// Cross-fade overlap, 0 without transitions
    pub fade: f64,
    pub fps: u32,
    pub size: CanvasSize,
    pub background: Background,
    pub audio: Option<PathBuf>,
    pub motion: MotionMode,
    pub audio_fit: AudioFitMode,
    pub fit_mode: FitMode,
    /// Keyed by resolved path
    pub crop_offsets: HashMap<PathBuf, CropOffset>,
    pub seed: Option<u64>,
}

impl BuildPlan {
    /// Offset for `path`, center when none was given
    pub fn offset_for(&self, path: &Path) -> CropOffset {
        self.crop_offsets
            .get(&match_key(path))
            .copied()
            .unwrap_or(CropOffset::CENTER)
    }

    /// Frame spec for the image at 0-based `position`
    pub fn frame_spec(&self, position: usize) -> Option<FrameSpec> {
        let path = self.images.get(position)?;
        Some(FrameSpec {
            path: path.clone(),
            index: position + 1,
            size: self.size,
            fit_mode: self.fit_mode,
            background: self.background,
            offset: self.offset_for(path),
            duration: self.sec_per,
        })
    }

    /// Length of the assembled timeline
    pub fn expected_duration(&self) -> f64 {
        let n = self.images.len() as f64;
        n * self.sec_per - (n - 1.0).max(0.0) * self.fade
    }
}
