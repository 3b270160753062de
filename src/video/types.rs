use image::{ImageBuffer, Rgb, RgbImage};
use std::path::PathBuf;

/// A single output video frame
///
/// Thin wrapper around an RGB image buffer. Every frame handed to the encoder
/// has exactly the canvas dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw interleaved RGB bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Linear blend `self * (1 - alpha) + other * alpha`.
    ///
    /// Both frames must have the same dimensions.
    pub fn blend(&self, other: &Frame, alpha: f64) -> Frame {
        let alpha = alpha.clamp(0.0, 1.0) as f32;
        let keep = 1.0 - alpha;
        let data = self
            .buffer
            .as_raw()
            .iter()
            .zip(other.buffer.as_raw())
            .map(|(&a, &b)| (a as f32 * keep + b as f32 * alpha).round() as u8)
            .collect();

        // identical dimensions give a buffer of the right length
        let buffer = ImageBuffer::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| self.buffer.clone());
        Frame::new(buffer)
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: u64,
    pub file_size: u64,
}
