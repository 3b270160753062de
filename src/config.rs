use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    canvas::{BackgroundColor, CanvasSize, IMAGE_EXTENSIONS},
    error::{ConfigError, Result},
    timing::FadeModel,
};

/// Main configuration for vertical-reel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output defaults used by the front ends
    pub output: OutputConfig,

    /// Cross-fade timing model
    pub timing: TimingConfig,

    /// Letterbox background tuning
    pub background: BackgroundConfig,

    /// Pan/zoom motion tuning
    pub motion: MotionConfig,

    /// ffmpeg settings
    pub encoder: EncoderConfig,

    /// Input image collection
    pub input: InputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.timing.validate()?;
        self.background.validate()?;
        self.motion.validate()?;
        self.encoder.validate()?;
        self.input.validate()?;
        Ok(())
    }
}

fn invalid<V: ToString>(key: &str, value: V) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Output defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Seconds per image when no total duration is requested
    pub sec_per: f64,
    pub background: BackgroundColor,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let size = CanvasSize::default();
        Self {
            width: size.width,
            height: size.height,
            fps: 30,
            sec_per: 4.0,
            background: BackgroundColor::BLACK,
        }
    }
}

impl OutputConfig {
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("output.size", format!("{}x{}", self.width, self.height)).into());
        }
        if self.fps == 0 {
            return Err(invalid("output.fps", self.fps).into());
        }
        if !(self.sec_per > 0.0) {
            return Err(invalid("output.sec_per", self.sec_per).into());
        }
        Ok(())
    }
}

/// `fade = min(sec_per * fade_ratio, fade_max)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fade_ratio: f64,
    pub fade_max: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let model = FadeModel::default();
        Self {
            fade_ratio: model.ratio,
            fade_max: model.max,
        }
    }
}

impl TimingConfig {
    pub fn fade_model(&self) -> FadeModel {
        FadeModel::new(self.fade_ratio, self.fade_max)
    }

    fn validate(&self) -> Result<()> {
        // ratio must stay below 1 or a clip could be swallowed by its own fade
        if !(self.fade_ratio > 0.0 && self.fade_ratio < 1.0) {
            return Err(invalid("timing.fade_ratio", self.fade_ratio).into());
        }
        if !(self.fade_max > 0.0) {
            return Err(invalid("timing.fade_max", self.fade_max).into());
        }
        Ok(())
    }
}

/// Empirical blur/brightness constants for letterbox backgrounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Blur radius of the fancy fit background (px)
    pub blur_radius: f32,

    /// Brightness multiplier of the fancy fit background
    pub brightness: f32,

    /// Blur radius of the static backdrop behind animated fit content (px)
    pub motion_blur_radius: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            blur_radius: 30.0,
            brightness: 0.5,
            motion_blur_radius: 35.0,
        }
    }
}

impl BackgroundConfig {
    fn validate(&self) -> Result<()> {
        if !(self.blur_radius >= 0.0) {
            return Err(invalid("background.blur_radius", self.blur_radius).into());
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(invalid("background.brightness", self.brightness).into());
        }
        if !(self.motion_blur_radius >= 0.0) {
            return Err(invalid("background.motion_blur_radius", self.motion_blur_radius).into());
        }
        Ok(())
    }
}

/// Pan/zoom tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Extra scale beyond cover-fill kept as slack for motion
    pub cover_overscan: f64,

    /// Extra scale of content inside the fit window
    pub fit_overscan: f64,

    /// Zoom style travels between 1.0 and this scale
    pub zoom_scale: f64,

    /// Constant scale used while panning
    pub pan_scale: f64,

    /// Fraction of the cover slack travelled by a pan
    pub cover_pan_travel: f64,

    /// Fraction of the window slack travelled by a pan in fit layout
    pub fit_pan_travel: f64,

    /// Strength of the simple (non Ken Burns) zoom
    pub simple_zoom_strength: f64,

    /// Probability that a new batch uses the zoom style
    pub zoom_probability: f64,

    /// Shortest batch, in frames
    pub batch_min: u32,

    /// Longest batch, in frames
    pub batch_max: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            cover_overscan: 0.06,
            fit_overscan: 0.08,
            zoom_scale: 1.05,
            pan_scale: 1.005,
            cover_pan_travel: 0.7,
            fit_pan_travel: 0.8,
            simple_zoom_strength: 0.03,
            zoom_probability: 0.30,
            batch_min: 2,
            batch_max: 4,
        }
    }
}

impl MotionConfig {
    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("motion.cover_overscan", self.cover_overscan),
            ("motion.fit_overscan", self.fit_overscan),
            ("motion.simple_zoom_strength", self.simple_zoom_strength),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(key, value).into());
            }
        }

        // scales below 1 would expose canvas edges
        for (key, value) in [
            ("motion.zoom_scale", self.zoom_scale),
            ("motion.pan_scale", self.pan_scale),
        ] {
            if !(value >= 1.0) {
                return Err(invalid(key, value).into());
            }
        }

        for (key, value) in [
            ("motion.cover_pan_travel", self.cover_pan_travel),
            ("motion.fit_pan_travel", self.fit_pan_travel),
            ("motion.zoom_probability", self.zoom_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, value).into());
            }
        }

        if self.batch_min == 0 || self.batch_min > self.batch_max {
            let range = format!("{}-{}", self.batch_min, self.batch_max);
            return Err(invalid("motion.batch_range", range).into());
        }
        Ok(())
    }
}

/// ffmpeg encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// ffmpeg executable name or path
    pub ffmpeg: String,

    pub video_codec: String,

    pub audio_codec: String,

    /// x264 preset
    pub preset: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,

    pub audio_bitrate: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            quality: 85,
            audio_bitrate: "192k".to_string(),
        }
    }
}

impl EncoderConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg.trim().is_empty() {
            return Err(invalid("encoder.ffmpeg", "<empty>").into());
        }
        if self.quality > 100 {
            return Err(invalid("encoder.quality", self.quality).into());
        }
        Ok(())
    }
}

/// Input collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Extensions picked up when a directory is given
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: IMAGE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl InputConfig {
    fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(invalid("input.extensions", "[]").into());
        }
        Ok(())
    }
}
