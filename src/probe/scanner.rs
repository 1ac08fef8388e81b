//! FFmpeg-backed prober

use std::collections::BTreeMap;
use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::error::{ProbeError, Result};

use super::{ProbeResult, Prober};

/// Initialize FFmpeg once at startup and quiet its own logging
pub fn init() -> Result<()> {
    ffmpeg::init()
        .map_err(|e| ProbeError::InitFailed(format!("ffmpeg::init() failed: {}", e)))?;
    // Demuxer chatter would interleave with our own output
    unsafe {
        ffmpeg::ffi::av_log_set_level(ffmpeg::ffi::AV_LOG_ERROR as i32);
    }
    tracing::debug!("FFmpeg initialized");
    Ok(())
}

/// Opens files with libavformat and reads the FLAC stream parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegProber;

impl Prober for FfmpegProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult> {
        ffmpeg::init()
            .map_err(|e| ProbeError::InitFailed(format!("ffmpeg::init() failed: {}", e)))?;

        let context = ffmpeg::format::input(&path)
            .map_err(|e| ProbeError::OpenInput(format!("Failed to open {:?}: {}", path, e)))?;

        let stream = context
            .streams()
            .find(|s| s.parameters().id() == ffmpeg::codec::Id::FLAC)
            .ok_or_else(|| ProbeError::NoFlacStream(path.display().to_string()))?;

        let codec_id = stream.parameters().id();
        let (sample_rate, bits_per_sample) = unsafe {
            let params_ptr = stream.parameters().as_ptr();
            (
                (*params_ptr).sample_rate.max(0) as u32,
                (*params_ptr).bits_per_raw_sample.max(0) as u32,
            )
        };

        // Vorbis comments land on the container; casing is whatever the
        // file was tagged with.
        let mut tags = BTreeMap::new();
        for (key, value) in context.metadata().iter() {
            tags.insert(key.to_uppercase(), value.to_string());
        }
        for (key, value) in stream.metadata().iter() {
            tags.entry(key.to_uppercase())
                .or_insert_with(|| value.to_string());
        }

        tracing::debug!(
            "Probed {:?}: codec={}, {}Hz, {}-bit, {} tags",
            path,
            codec_id.name(),
            sample_rate,
            bits_per_sample,
            tags.len()
        );

        Ok(ProbeResult {
            path: path.to_path_buf(),
            codec: codec_id.name().to_string(),
            sample_rate,
            bits_per_sample,
            tags,
        })
    }
}
