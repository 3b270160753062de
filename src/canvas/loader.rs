use std::path::{Path, PathBuf};

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use tracing::{debug, info, warn};

use crate::error::{ImageError, Result};

/// Basic facts about an input image, gathered without a full decode
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Open an image, apply its EXIF orientation and convert it to 8-bit RGB.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    let load_failed = |reason: String| ImageError::LoadFailed {
        path: path.display().to_string(),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| load_failed(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_failed(e.to_string()))?;
    if reader.format().is_none() {
        return Err(ImageError::UnsupportedFormat {
            path: path.display().to_string(),
        }
        .into());
    }

    let mut decoder = reader.into_decoder().map_err(|e| load_failed(e.to_string()))?;
    // A broken EXIF block should not make an otherwise readable image fail
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| load_failed(e.to_string()))?;
    image.apply_orientation(orientation);

    let rgb = image.into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(load_failed("image has zero size".to_string()).into());
    }

    debug!(
        "Loaded {:?}: {}x{} ({:?})",
        path,
        rgb.width(),
        rgb.height(),
        orientation
    );
    Ok(rgb)
}

/// Bulk pre-scan for previews and summaries.
///
/// Unlike the build pipeline, unreadable files are skipped and logged here.
pub fn scan_images<P: AsRef<Path>>(paths: &[P]) -> Vec<ImageInfo> {
    let mut infos = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        match image::image_dimensions(path) {
            Ok((width, height)) if width > 0 && height > 0 => infos.push(ImageInfo {
                path: path.to_path_buf(),
                width,
                height,
            }),
            Ok(_) => warn!("Skipping empty image {:?}", path),
            Err(e) => warn!("Skipping unreadable image {:?}: {}", path, e),
        }
    }

    info!("Scanned {} of {} images", infos.len(), paths.len());
    infos
}
