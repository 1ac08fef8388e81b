//! Copying non-audio files alongside a transcode

use std::path::Path;

use crate::error::Result;

/// Whether a file is cover art that should travel with every variant
pub fn is_artwork(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg") || lower.ends_with(".png")
}

/// Copy the images directly inside `in_dir` to `out_dir`; returns how many
pub async fn copy_artwork(in_dir: &Path, out_dir: &Path) -> Result<usize> {
    let mut copied = 0;
    let mut entries = tokio::fs::read_dir(in_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !is_artwork(&name.to_string_lossy()) || !entry.file_type().await?.is_file() {
            continue;
        }
        tokio::fs::copy(entry.path(), out_dir.join(&name)).await?;
        copied += 1;
    }
    if copied > 0 {
        tracing::debug!("Copied {} images {:?} -> {:?}", copied, in_dir, out_dir);
    }
    Ok(copied)
}
