//! Image catalog built from the data directory

use std::path::Path;

use labeler_common::{paths::to_catalog_path, ImageDescriptor, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions (lowercase) treated as images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Recursively list every image under `data_dir`
///
/// Sorted by display name, ties broken by path. A missing data directory
/// yields an empty catalog.
pub fn scan_images(data_dir: &Path) -> Result<Vec<ImageDescriptor>> {
    if !data_dir.exists() {
        warn!("Data directory does not exist: {}", data_dir.display());
        return Ok(Vec::new());
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(data_dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(data_dir) else {
            continue;
        };

        images.push(ImageDescriptor {
            path: to_catalog_path(relative),
            name: entry.file_name().to_string_lossy().into_owned(),
        });
    }

    images.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    Ok(images)
}

/// Whether the file extension marks an image we serve
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// MIME type for an image path, by extension
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
