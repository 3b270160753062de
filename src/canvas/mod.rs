//! # Canvas
//!
//! Input image collection, decoding and the static frame compositor.
//!
//! Two layouts are supported:
//!
//! - **fit**: the whole image is visible, centered over a solid color or a
//!   blurred, darkened copy of itself.
//! - **cover**: the canvas is fully covered and the overflow cropped; a
//!   [`CropOffset`] picks which part of the image survives.

pub mod compositor;
pub mod loader;
pub mod source;
pub mod types;

pub use compositor::{
    blurred_backdrop, cover_center, cover_dimensions, fit_dimensions, soft_blur, Compositor,
};
pub use loader::{load_image, scan_images, ImageInfo};
pub use source::{collect_images, expand_build_inputs, FRONTEND_IMAGE_EXTENSIONS, IMAGE_EXTENSIONS};
pub use types::{Background, BackgroundColor, CanvasSize, CropOffset, FitMode, FrameSpec};
