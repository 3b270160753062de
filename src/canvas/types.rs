use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ReelError, Result};

/// Output canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::invalid(
                "size",
                format!("width and height must be positive, got {}x{}", self.width, self.height),
            ));
        }
        Ok(())
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a source image is mapped onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole image visible, letterboxed over a background
    #[default]
    Fit,
    /// Canvas fully covered, overflow cropped
    Cover,
}

impl FromStr for FitMode {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fit" => Ok(Self::Fit),
            "cover" => Ok(Self::Cover),
            other => Err(ReelError::invalid(
                "fit_mode",
                format!("unknown value '{}', expected 'fit' or 'cover'", other),
            )),
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fit => "fit",
            Self::Cover => "cover",
        })
    }
}

/// Flat letterbox color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackgroundColor(pub [u8; 3]);

impl BackgroundColor {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for BackgroundColor {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => {}
        }

        let hex = value.strip_prefix('#').unwrap_or(&value);
        let parsed = (hex.len() == 6 && hex.is_ascii())
            .then(|| {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some([channel(0)?, channel(2)?, channel(4)?])
            })
            .flatten();

        parsed.map(Self).ok_or_else(|| {
            ReelError::invalid(
                "bg",
                format!("unknown color '{}', expected black, white or #rrggbb", s),
            )
        })
    }
}

impl TryFrom<String> for BackgroundColor {
    type Error = ReelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BackgroundColor> for String {
    fn from(color: BackgroundColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BLACK => f.write_str("black"),
            Self::WHITE => f.write_str("white"),
            Self([r, g, b]) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

/// What fills the canvas around a fitted image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(BackgroundColor),
    /// Blurred, darkened stretch of the source image itself
    BlurredSelf,
}

impl Background {
    pub fn from_options(color: BackgroundColor, fancy: bool) -> Self {
        if fancy {
            Self::BlurredSelf
        } else {
            Self::Solid(color)
        }
    }
}

/// Crop window offset for cover mode.
///
/// `-1` aligns the window to the top/left edge, `0` centers it, `+1` aligns it
/// to the bottom/right edge. Components are clamped to `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropOffset {
    x: f64,
    y: f64,
}

impl CropOffset {
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Crop window origin inside `(extra_x, extra_y)` pixels of overflow
    pub fn origin(&self, extra_x: u32, extra_y: u32) -> (u32, u32) {
        let place = |extra: u32, offset: f64| -> u32 {
            let pos = (extra as f64 * (offset + 1.0) / 2.0).round() as u32;
            pos.min(extra)
        };
        (place(extra_x, self.x), place(extra_y, self.y))
    }
}

impl FromStr for CropOffset {
    type Err = ReelError;

    /// Parses `"ox,oy"`, e.g. `"-1,0.5"`
    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || ReelError::invalid("crop_offset", format!("expected 'ox,oy', got '{}'", s));
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x: f64 = x.trim().parse().map_err(|_| invalid())?;
        let y: f64 = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// Everything needed to turn one input image into one clip
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub path: PathBuf,
    /// 1-based position in the input sequence
    pub index: usize,
    pub size: CanvasSize,
    pub fit_mode: FitMode,
    pub background: Background,
    /// Only meaningful in cover mode
    pub offset: CropOffset,
    /// Clip duration in seconds
    pub duration: f64,
}
