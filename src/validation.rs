//! Probe result validation
//!
//! Pure checks run before any transcode is attempted:
//! - every file shares one sample rate, and that rate is at least 44.1 kHz
//! - at least one file carries the full set of required tags

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::probe::ProbeResult;

/// Lowest accepted source sample rate
pub const MIN_SAMPLE_RATE: u32 = 44_100;

/// Tags that at least one file must carry
pub const REQUIRED_TAGS: [&str; 4] = ["TITLE", "ARTIST", "ALBUM", "TRACK"];

/// Why no sample rate could be confirmed for a release
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleRateError {
    #[error("No files to read a sample rate from")]
    NoFiles,

    #[error("Inconsistent sample rates, {expected} vs {found} ({path:?})")]
    Inconsistent {
        expected: u32,
        found: u32,
        path: PathBuf,
    },

    #[error("Sample rate below minimum, {rate} ({path:?})")]
    BelowMinimum { rate: u32, path: PathBuf },
}

/// No file carries every required tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct MissingTags {
    /// Per file, the required tags it lacks
    pub files: Vec<(PathBuf, Vec<&'static str>)>,
}

impl fmt::Display for MissingTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Required tags are not present")?;
        for (path, missing) in &self.files {
            write!(f, "; {:?} lacks {}", path, missing.join(","))?;
        }
        Ok(())
    }
}

/// Return the one sample rate shared by all files.
///
/// The first file seeds the expected rate; any deviation or any rate below
/// [`MIN_SAMPLE_RATE`] is a failure.
pub fn consistent_sample_rate(probes: &[ProbeResult]) -> Result<u32, SampleRateError> {
    let first = probes.first().ok_or(SampleRateError::NoFiles)?;
    let expected = first.sample_rate;

    for probe in probes {
        if probe.sample_rate != expected {
            return Err(SampleRateError::Inconsistent {
                expected,
                found: probe.sample_rate,
                path: probe.path.clone(),
            });
        }
        if probe.sample_rate < MIN_SAMPLE_RATE {
            return Err(SampleRateError::BelowMinimum {
                rate: probe.sample_rate,
                path: probe.path.clone(),
            });
        }
    }

    Ok(expected)
}

/// Required tags this file lacks, compared case-insensitively
pub fn missing_tags(probe: &ProbeResult) -> Vec<&'static str> {
    REQUIRED_TAGS
        .iter()
        .copied()
        .filter(|tag| !probe.has_tag(tag))
        .collect()
}

/// Pass when at least one file carries all of [`REQUIRED_TAGS`].
///
/// Compilations may only tag per track, so this is not a per-file check.
pub fn check_required_tags(probes: &[ProbeResult]) -> Result<(), MissingTags> {
    if probes.iter().any(|p| missing_tags(p).is_empty()) {
        return Ok(());
    }
    Err(MissingTags {
        files: probes
            .iter()
            .map(|p| (p.path.clone(), missing_tags(p)))
            .collect(),
    })
}
