//! Torrent packaging of produced variants

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::TorrentConfig;
use crate::error::{Result, ToolError, TranscodeError};
use crate::transcode::process::run_tool;

/// Turns a variant directory into a distributable torrent file
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    async fn build(&self, dir: &Path, torrent_path: &Path) -> Result<()>;
}

/// Private torrents built with mktorrent
#[derive(Debug, Clone)]
pub struct Mktorrent {
    program: PathBuf,
    announce: String,
    source: String,
    piece_length: u8,
}

impl Mktorrent {
    pub fn new(program: PathBuf, announce: &str, torrent: &TorrentConfig) -> Self {
        Self {
            program,
            announce: announce.to_string(),
            source: torrent.source.clone(),
            piece_length: torrent.piece_length,
        }
    }

    pub fn args(&self, dir: &Path, torrent_path: &Path) -> Vec<OsString> {
        let mut output = OsString::from("--output=");
        output.push(torrent_path);
        vec![
            format!("--piece-length={}", self.piece_length).into(),
            "--private".into(),
            format!("--source={}", self.source).into(),
            format!("--announce={}", self.announce).into(),
            dir.into(),
            output,
        ]
    }
}

#[async_trait]
impl PackageBuilder for Mktorrent {
    async fn build(&self, dir: &Path, torrent_path: &Path) -> Result<()> {
        tracing::info!("Creating torrent {:?}", torrent_path);
        run_tool(&self.program, &self.args(dir, torrent_path)).await?;

        if !tokio::fs::try_exists(torrent_path).await? {
            return Err(TranscodeError::Tool(ToolError::MissingOutput {
                program: self.program.display().to_string(),
                path: torrent_path.to_path_buf(),
            }));
        }
        Ok(())
    }
}
