//! MP3 transcoding with flac2mp3
//!
//! flac2mp3 walks the source tree itself and spreads the work over
//! `--processes` workers.

use std::ffi::OsString;
use std::path::Path;

use crate::error::Result;
use crate::plan::Mp3Preset;

use super::artwork::copy_artwork;
use super::process::run_tool;

/// Method description recorded in the release description
pub fn mp3_method(preset: Mp3Preset) -> String {
    format!("flac2mp3 --preset={}", preset.as_arg())
}

pub fn flac2mp3_args(preset: Mp3Preset, processes: usize, in_dir: &Path, out_dir: &Path) -> Vec<OsString> {
    vec![
        format!("--preset={}", preset.as_arg()).into(),
        format!("--processes={}", processes).into(),
        in_dir.into(),
        out_dir.into(),
    ]
}

/// Transcode `in_dir` to MP3 at `preset` into `out_dir`
pub async fn transcode_mp3(
    flac2mp3: &Path,
    processes: usize,
    in_dir: &Path,
    out_dir: &Path,
    preset: Mp3Preset,
) -> Result<String> {
    tracing::info!("MP3 {} transcode {:?} -> {:?}", preset.as_arg(), in_dir, out_dir);

    run_tool(flac2mp3, &flac2mp3_args(preset, processes, in_dir, out_dir)).await?;
    tokio::fs::create_dir_all(out_dir).await?;
    copy_artwork(in_dir, out_dir).await?;

    Ok(mp3_method(preset))
}
