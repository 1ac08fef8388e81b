//! Transcode executors
//!
//! This module produces planned variants with external tools:
//! - 16-bit FLAC via sox
//! - MP3 V0 / 320 via flac2mp3
//! - Copying cover art into every output directory

pub mod artwork;
pub mod flac;
pub mod mp3;
pub mod process;

use std::path::Path;

use async_trait::async_trait;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::plan::{EncodeParams, VariantPlan};

/// Produces one variant directory from a source directory
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write the variant into `out_dir`; returns the method description
    async fn transcode(&self, plan: &VariantPlan, in_dir: &Path, out_dir: &Path) -> Result<String>;
}

/// Transcoder backed by sox and flac2mp3
#[derive(Debug, Clone)]
pub struct ToolTranscoder {
    tools: ToolsConfig,
}

impl ToolTranscoder {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Transcoder for ToolTranscoder {
    async fn transcode(&self, plan: &VariantPlan, in_dir: &Path, out_dir: &Path) -> Result<String> {
        match plan.params {
            EncodeParams::Flac16 { sample_rate } => {
                flac::transcode_flac16(&self.tools.sox, in_dir, out_dir, sample_rate).await
            }
            EncodeParams::Mp3 { preset } => {
                mp3::transcode_mp3(
                    &self.tools.flac2mp3,
                    self.tools.processes,
                    in_dir,
                    out_dir,
                    preset,
                )
                .await
            }
        }
    }
}
