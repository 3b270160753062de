use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::canvas::loader::load_image;
use crate::canvas::types::{Background, BackgroundColor, CanvasSize, CropOffset, FitMode, FrameSpec};
use crate::config::BackgroundConfig;
use crate::error::Result;
use crate::video::Frame;

/// Size of `src` scaled uniformly to fit inside `size`.
///
/// The limiting dimension always comes out equal to the canvas dimension.
pub fn fit_dimensions(src: (u32, u32), size: CanvasSize) -> (u32, u32) {
    let (iw, ih) = (src.0.max(1) as f64, src.1.max(1) as f64);
    let k = (size.width as f64 / iw).min(size.height as f64 / ih);
    let w = ((iw * k).round() as u32).clamp(1, size.width);
    let h = ((ih * k).round() as u32).clamp(1, size.height);
    (w, h)
}

/// Size of `src` scaled uniformly to cover `size`, never smaller than the canvas
pub fn cover_dimensions(src: (u32, u32), size: CanvasSize) -> (u32, u32) {
    let (iw, ih) = (src.0.max(1) as f64, src.1.max(1) as f64);
    let k = (size.width as f64 / iw).max(size.height as f64 / ih);
    let w = ((iw * k).round() as u32).max(size.width);
    let h = ((ih * k).round() as u32).max(size.height);
    (w, h)
}

/// Multiply every channel by `factor`
pub fn darken(image: &mut RgbImage, factor: f32) {
    let factor = factor.max(0.0);
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (*channel as f32 * factor).round().min(255.0) as u8;
        }
    }
}

/// Center-cropped cover layout of `source`, no offset
pub fn cover_center(source: &RgbImage, size: CanvasSize) -> RgbImage {
    cover_crop(source, size, CropOffset::CENTER)
}

fn cover_crop(source: &RgbImage, size: CanvasSize, offset: CropOffset) -> RgbImage {
    let (new_w, new_h) = cover_dimensions(source.dimensions(), size);
    let resized = imageops::resize(source, new_w, new_h, FilterType::Lanczos3);

    let (left, top) = offset.origin(new_w - size.width, new_h - size.height);
    imageops::crop_imm(&resized, left, top, size.width, size.height).to_image()
}

/// Gaussian-like blur, `radius` capped to a quarter of the shorter side
pub fn soft_blur(image: &RgbImage, radius: f32) -> RgbImage {
    let cap = image.width().min(image.height()) as f32 / 4.0;
    let sigma = radius.min(cap);
    if !(sigma > 0.0) {
        return image.clone();
    }
    imageops::fast_blur(image, sigma)
}

/// Source stretched edge-to-edge, blurred and darkened
pub fn blurred_backdrop(
    source: &RgbImage,
    size: CanvasSize,
    radius: f32,
    brightness: f32,
) -> RgbImage {
    let stretched = imageops::resize(source, size.width, size.height, FilterType::Triangle);
    let mut blurred = soft_blur(&stretched, radius);
    darken(&mut blurred, brightness);
    blurred
}

/// Maps a source image onto a fixed canvas in fit or cover layout
#[derive(Debug, Clone)]
pub struct Compositor {
    blur_radius: f32,
    brightness: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(&BackgroundConfig::default())
    }
}

impl Compositor {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            blur_radius: config.blur_radius,
            brightness: config.brightness,
        }
    }

    /// Composite `source` according to `spec`. The result is exactly `spec.size`.
    pub fn compose(&self, source: &RgbImage, spec: &FrameSpec) -> Frame {
        let frame = match spec.fit_mode {
            FitMode::Cover => cover_crop(source, spec.size, spec.offset),
            FitMode::Fit => self.letterbox(source, spec.size, spec.background),
        };

        debug!(
            "Composited frame {} ({}) {}x{} -> {}",
            spec.index,
            spec.fit_mode,
            source.width(),
            source.height(),
            spec.size
        );
        Frame::new(frame)
    }

    /// Load the image at `spec.path` and composite it
    pub fn compose_file(&self, spec: &FrameSpec) -> Result<Frame> {
        let source = load_image(&spec.path)?;
        Ok(self.compose(&source, spec))
    }

    fn letterbox(&self, source: &RgbImage, size: CanvasSize, background: Background) -> RgbImage {
        let (new_w, new_h) = fit_dimensions(source.dimensions(), size);
        let resized = imageops::resize(source, new_w, new_h, FilterType::Lanczos3);

        let mut canvas = match background {
            Background::BlurredSelf => {
                blurred_backdrop(source, size, self.blur_radius, self.brightness)
            }
            Background::Solid(BackgroundColor(rgb)) => {
                RgbImage::from_pixel(size.width, size.height, Rgb(rgb))
            }
        };

        let x = (size.width - new_w) / 2;
        let y = (size.height - new_h) / 2;
        imageops::replace(&mut canvas, &resized, x as i64, y as i64);
        canvas
    }
}
