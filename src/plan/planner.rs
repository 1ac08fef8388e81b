//! Transcode planner - determines which variants to produce

use std::fmt;

use crate::edition::EditionGroup;
use crate::probe::ProbeResult;
use crate::validation::SampleRateError;

/// Encoding label of a 16-bit lossless entry
pub const LOSSLESS_LABEL: &str = "Lossless";

/// Bit depth required of every source file for a FLAC16 transcode
pub const HIGH_RES_BIT_DEPTH: u32 = 24;

/// Output container/codec family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Flac,
    Mp3,
}

impl FormatKind {
    /// Name used by the catalogue
    pub fn as_str(self) -> &'static str {
        match self {
            FormatKind::Flac => "FLAC",
            FormatKind::Mp3 => "MP3",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LAME preset handed to flac2mp3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mp3Preset {
    V0,
    Cbr320,
}

impl Mp3Preset {
    /// Value of `--preset=`
    pub fn as_arg(self) -> &'static str {
        match self {
            Mp3Preset::V0 => "V0",
            Mp3Preset::Cbr320 => "320",
        }
    }

    /// Catalogue encoding label
    pub fn label(self) -> &'static str {
        match self {
            Mp3Preset::V0 => "V0 (VBR)",
            Mp3Preset::Cbr320 => "320",
        }
    }
}

/// Parameters for the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeParams {
    /// Dither down to 16 bits, resampling to `sample_rate`
    Flac16 { sample_rate: u32 },
    Mp3 { preset: Mp3Preset },
}

/// A decision to produce one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantPlan {
    pub format: FormatKind,
    /// Catalogue encoding label
    pub label: &'static str,
    pub params: EncodeParams,
}

impl VariantPlan {
    pub fn flac16(sample_rate: u32) -> Self {
        Self {
            format: FormatKind::Flac,
            label: LOSSLESS_LABEL,
            params: EncodeParams::Flac16 { sample_rate },
        }
    }

    pub fn mp3(preset: Mp3Preset) -> Self {
        Self {
            format: FormatKind::Mp3,
            label: preset.label(),
            params: EncodeParams::Mp3 { preset },
        }
    }

    /// Suffix of the output directory name ("FLAC", "V0", "320")
    pub fn dir_suffix(&self) -> &'static str {
        match self.params {
            EncodeParams::Flac16 { .. } => "FLAC",
            EncodeParams::Mp3 { preset } => preset.as_arg(),
        }
    }
}

impl fmt::Display for VariantPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            EncodeParams::Flac16 { sample_rate } => {
                write!(f, "{} {} @ {}Hz", self.format, self.label, sample_rate)
            }
            EncodeParams::Mp3 { .. } => write!(f, "{} {}", self.format, self.label),
        }
    }
}

/// Why a FLAC16 transcode was wanted but not planned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanWarning {
    /// Some files are not 24-bit; the measured depths of those files
    BitDepthMismatch { found: Vec<u32> },
    /// No sample rate could be confirmed
    SampleRate(SampleRateError),
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::BitDepthMismatch { found } => {
                let found: Vec<String> = found.iter().map(|b| b.to_string()).collect();
                write!(
                    f,
                    "These are not 24bit flac. Found {}-bit too. Won't transcode this to flac16",
                    found.join(",")
                )
            }
            PlanWarning::SampleRate(e) => write!(f, "{}. Won't transcode this to flac16", e),
        }
    }
}

/// What the planner looks at
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    /// Existing entries of the candidate's edition
    pub edition_group: &'a EditionGroup<'a>,
    /// The candidate's own encoding is "24bit Lossless"
    pub source_is_24bit: bool,
    pub probes: &'a [ProbeResult],
    /// Outcome of the sample-rate check
    pub sample_rate: &'a Result<u32, SampleRateError>,
}

/// Ordered variants to produce plus anything that was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodePlan {
    pub variants: Vec<VariantPlan>,
    pub warnings: Vec<PlanWarning>,
}

impl TranscodePlan {
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Standard playback rate of the source rate's family: 48 kHz for
/// multiples of 48000, 44.1 kHz otherwise.
pub fn target_sample_rate(source_rate: u32) -> u32 {
    if source_rate % 48_000 == 0 {
        48_000
    } else {
        44_100
    }
}

/// Decide the variants to produce, in submission order: FLAC16, V0, 320.
pub fn plan_transcodes(input: PlanInput<'_>) -> TranscodePlan {
    let mut plan = TranscodePlan::default();

    if !input.edition_group.has_encoding(LOSSLESS_LABEL) && input.source_is_24bit {
        match plan_flac16(input.probes, input.sample_rate) {
            Ok(variant) => plan.variants.push(variant),
            Err(warnings) => plan.warnings.extend(warnings),
        }
    }

    for preset in [Mp3Preset::V0, Mp3Preset::Cbr320] {
        if !input.edition_group.has_encoding(preset.label()) {
            plan.variants.push(VariantPlan::mp3(preset));
        }
    }

    plan
}

fn plan_flac16(
    probes: &[ProbeResult],
    sample_rate: &Result<u32, SampleRateError>,
) -> Result<VariantPlan, Vec<PlanWarning>> {
    let mut warnings = Vec::new();

    let bad_depths: Vec<u32> = probes
        .iter()
        .map(|p| p.bits_per_sample)
        .filter(|bits| *bits != HIGH_RES_BIT_DEPTH)
        .collect();
    if !bad_depths.is_empty() {
        warnings.push(PlanWarning::BitDepthMismatch { found: bad_depths });
    }

    match sample_rate {
        Ok(rate) if warnings.is_empty() => Ok(VariantPlan::flac16(target_sample_rate(*rate))),
        Ok(_) => Err(warnings),
        Err(e) => {
            warnings.push(PlanWarning::SampleRate(e.clone()));
            Err(warnings)
        }
    }
}
