//! Transcode planning module
//!
//! This module decides which variants a release is missing:
//! - 16-bit FLAC from a 24-bit source, with a derived target sample rate
//! - MP3 V0 and MP3 320
//! - Warnings for variants that were wanted but cannot be made

pub mod planner;

pub use planner::{
    plan_transcodes, target_sample_rate, EncodeParams, FormatKind, Mp3Preset, PlanInput,
    PlanWarning, TranscodePlan, VariantPlan,
};
