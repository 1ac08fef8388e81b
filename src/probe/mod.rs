//! Source audio probing
//!
//! This module handles extraction of per-file audio facts:
//! - Codec, sample rate and bit depth of the FLAC stream
//! - Container and stream tags, keyed by uppercased tag name
//! - Concurrent probing of all files of one release

pub mod scanner;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;

pub use scanner::{init, FfmpegProber};

/// Audio facts about one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub path: PathBuf,
    /// Codec name as reported by FFmpeg, e.g. "flac"
    pub codec: String,
    pub sample_rate: u32,
    /// Measured bits per sample (`bits_per_raw_sample`)
    pub bits_per_sample: u32,
    /// Tag name (uppercased) to value
    pub tags: BTreeMap<String, String>,
}

impl ProbeResult {
    /// Whether a tag is present, ignoring case
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.keys().any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Reads audio facts from a file. Implementations may block.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, path: &Path) -> Result<ProbeResult>;
}

/// Probe every file concurrently and join the results in input order
pub async fn probe_all<P: Prober>(prober: Arc<P>, paths: &[PathBuf]) -> Result<Vec<ProbeResult>> {
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let prober = Arc::clone(&prober);
            tokio::task::spawn_blocking(move || prober.probe(&path))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await??);
    }

    tracing::debug!("Probed {} files", results.len());
    Ok(results)
}
