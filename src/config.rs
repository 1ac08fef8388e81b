//! Run configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TranscodeError};

/// Default catalogue API endpoint
pub const DEFAULT_API_URL: &str = "https://redacted.ch/ajax.php";

/// Catalogue connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// API endpoint (`ajax.php`)
    pub api_url: String,

    /// API token with the Torrents capability
    pub api_key: Option<String>,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

/// External tool locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the flac2mp3 script
    pub flac2mp3: PathBuf,

    /// sox executable
    pub sox: PathBuf,

    /// mktorrent executable
    pub mktorrent: PathBuf,

    /// Worker processes handed to flac2mp3
    pub processes: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            flac2mp3: std::env::var_os("FLAC2MP3")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("flac2mp3.pl")),
            sox: PathBuf::from("sox"),
            mktorrent: PathBuf::from("mktorrent"),
            processes: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Torrent creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentConfig {
    /// Full announce URL from the upload page
    pub announce: Option<String>,

    /// Source tag embedded in the info dictionary
    pub source: String,

    /// Piece length as a power of two (20 = 1 MiB)
    pub piece_length: u8,
}

impl Default for TorrentConfig {
    fn default() -> Self {
        Self {
            announce: None,
            source: "RED".to_string(),
            piece_length: 20,
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Catalogue configuration
    pub catalogue: CatalogueConfig,

    /// Tool configuration
    pub tools: ToolsConfig,

    /// Torrent configuration
    pub torrent: TorrentConfig,

    /// Transcodes end up here
    pub transcode_dir: PathBuf,

    /// Finished torrent files end up here
    pub torrent_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Stop after planning
    pub dry_run: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            catalogue: CatalogueConfig::default(),
            tools: ToolsConfig::default(),
            torrent: TorrentConfig::default(),
            transcode_dir: home.clone(),
            torrent_dir: home,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            dry_run: false,
        }
    }
}

impl RunConfig {
    /// API key, once validated
    pub fn api_key(&self) -> Result<&str> {
        self.catalogue
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TranscodeError::Config("missing required api key".to_string()))
    }

    /// Announce URL, once validated
    pub fn announce(&self) -> Result<&str> {
        self.torrent
            .announce
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| TranscodeError::Config("missing required announce URL".to_string()))
    }

    /// Check required settings and that output directories exist
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;
        self.announce()?;
        ensure_dir(&self.transcode_dir)?;
        ensure_dir(&self.torrent_dir)?;
        if self.tools.processes == 0 {
            return Err(TranscodeError::Config(
                "tools.processes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TranscodeError::Config(format!(
            "{} does not exist! Please create it.",
            path.display()
        )))
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("HOMEPATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
