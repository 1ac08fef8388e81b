//! 24-bit to 16-bit FLAC transcoding with sox
//!
//! Each `.flac` file is dithered to 16 bits and resampled to the planned
//! rate. Files are converted one after another; sox itself is multi-threaded.
//! Subdirectories (e.g. `CD1/`, `CD2/`) are mirrored into the output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::artwork::copy_artwork;
use super::process::run_tool;

/// Method description recorded in the release description
pub fn flac16_method(sample_rate: u32) -> String {
    format!(
        "sox -G input.flac -b16 output.flac rate -v -L {} dither",
        sample_rate
    )
}

/// sox arguments for one file
pub fn sox_args(input: &Path, output: &Path, sample_rate: u32) -> Vec<OsString> {
    vec![
        "--multi-threaded".into(),
        "--buffer=131072".into(),
        "-G".into(),
        input.into(),
        "-b16".into(),
        output.into(),
        "rate".into(),
        "-v".into(),
        "-L".into(),
        sample_rate.to_string().into(),
        "dither".into(),
    ]
}

/// Transcode every FLAC file under `in_dir` into `out_dir`
pub async fn transcode_flac16(
    sox: &Path,
    in_dir: &Path,
    out_dir: &Path,
    sample_rate: u32,
) -> Result<String> {
    tracing::info!("FLAC transcode {:?} -> {:?}", in_dir, out_dir);

    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(in_dir.to_path_buf(), out_dir.to_path_buf())];
    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst).await?;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&src).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        names.sort();

        for name in names {
            let input = src.join(&name);
            if name.to_string_lossy().ends_with(".flac") {
                tracing::info!("Transcoding {}...", name.to_string_lossy());
                run_tool(sox, &sox_args(&input, &dst.join(&name), sample_rate)).await?;
            } else if tokio::fs::symlink_metadata(&input).await?.is_dir() {
                pending.push((input, dst.join(&name)));
            }
        }

        copy_artwork(&src, &dst).await?;
    }

    Ok(flac16_method(sample_rate))
}
