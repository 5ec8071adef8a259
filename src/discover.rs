use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// Extensions accepted by the directory scan. Matching is exact: the
/// original pipeline never case-folded, so `IMG.JPG` is skipped.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// List the still images directly inside `image_dir`, sorted
/// lexicographically by full path.
///
/// Subdirectories are not entered. A missing or unreadable directory yields
/// an empty list rather than an error; existence is diagnosed by the caller
/// and enforced by nothing (a truly absent input surfaces later, from the
/// encoder).
pub fn find_images<P: AsRef<Path>>(image_dir: P) -> Result<Vec<PathBuf>> {
    let image_dir = image_dir.as_ref();
    let mut images = Vec::new();

    for entry in WalkDir::new(image_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(extension) = entry.path().extension() {
            if let Some(ext_str) = extension.to_str() {
                if IMAGE_EXTENSIONS.contains(&ext_str) {
                    images.push(entry.path().to_path_buf());
                }
            }
        }
    }

    images.sort_unstable();
    debug!("Found {} image files in {}", images.len(), image_dir.display());

    Ok(images)
}

/// Split the sorted image list into consecutive batches of at most
/// `batch_size` entries. The last batch may be smaller; `N` images yield
/// `ceil(N / batch_size)` batches.
pub fn partition(images: &[PathBuf], batch_size: usize) -> Vec<&[PathBuf]> {
    let batch_size = batch_size.max(1);
    images.chunks(batch_size).collect()
}
