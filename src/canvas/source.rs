use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ReelError, Result};

/// Image extensions the core accepts
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extensions accepted by the front ends
pub const FRONTEND_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Case-insensitive extension check
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Matching image files directly inside `directory`, sorted by file name
pub fn list_directory<S: AsRef<str>>(directory: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && !is_hidden_file(&path) && has_extension(&path, extensions) {
            images.push(path);
        }
    }

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} images in {:?}", images.len(), directory);
    Ok(images)
}

fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// Collect input images from files and/or directories.
///
/// Directories expand to their matching entries sorted by name. Files with a
/// wrong extension are skipped with a warning, a missing path is an error,
/// duplicates are removed keeping the first occurrence.
pub fn collect_images<P, S>(inputs: &[P], extensions: &[S]) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut paths = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let found = list_directory(input, extensions)?;
            if found.is_empty() {
                warn!("No images in directory {:?}", input);
            }
            paths.extend(found);
        } else if input.is_file() {
            if has_extension(input, extensions) {
                paths.push(input.to_path_buf());
            } else {
                warn!("Skipping unsupported image format: {:?}", input);
            }
        } else {
            return Err(ReelError::path_not_found(input));
        }
    }

    let unique = dedup_preserving_order(paths);
    if unique.is_empty() {
        let joined = inputs
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ReelError::PathNotFound {
            path: format!("no images found in [{}]", joined),
        });
    }

    info!("Collected {} input images", unique.len());
    Ok(unique)
}

/// Resolve the image list of a build request.
///
/// Directories expand like [`collect_images`]; files are taken as given so a
/// bad file fails the build when it is decoded instead of being dropped.
pub fn expand_build_inputs<S: AsRef<str>>(
    inputs: &[PathBuf],
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(inputs.len());

    for input in inputs {
        if input.is_dir() {
            paths.extend(list_directory(input, extensions)?);
        } else if input.exists() {
            paths.push(input.clone());
        } else {
            return Err(ReelError::path_not_found(input));
        }
    }

    Ok(paths)
}
