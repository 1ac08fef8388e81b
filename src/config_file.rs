//! Configuration file support
//!
//! Loads run configuration from TOML files. Every section and key is
//! optional; anything left out keeps its built-in default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::RunConfig;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Catalogue settings
    pub catalogue: Option<CatalogueSettings>,
    /// Output directories
    pub paths: Option<PathSettings>,
    /// External tools
    pub tools: Option<ToolSettings>,
    /// Torrent settings
    pub torrent: Option<TorrentSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueSettings {
    /// API endpoint
    pub api_url: Option<String>,
    /// API token
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output directory of transcodes
    pub transcode_dir: Option<PathBuf>,
    /// Output directory of torrent files
    pub torrent_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    pub flac2mp3: Option<PathBuf>,
    pub sox: Option<PathBuf>,
    pub mktorrent: Option<PathBuf>,
    /// Worker processes for flac2mp3
    pub processes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TorrentSettings {
    /// Announce URL
    pub announce: Option<String>,
    /// Source tag
    pub source: Option<String>,
    /// Piece length exponent
    pub piece_length: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Convert to RunConfig, falling back to defaults for missing keys
    pub fn into_run_config(self) -> RunConfig {
        let mut config = RunConfig::default();

        if let Some(c) = self.catalogue {
            if let Some(url) = c.api_url {
                config.catalogue.api_url = url;
            }
            config.catalogue.api_key = c.api_key.or(config.catalogue.api_key);
        }
        if let Some(p) = self.paths {
            if let Some(dir) = p.transcode_dir {
                config.transcode_dir = dir;
            }
            if let Some(dir) = p.torrent_dir {
                config.torrent_dir = dir;
            }
        }
        if let Some(t) = self.tools {
            if let Some(path) = t.flac2mp3 {
                config.tools.flac2mp3 = path;
            }
            if let Some(path) = t.sox {
                config.tools.sox = path;
            }
            if let Some(path) = t.mktorrent {
                config.tools.mktorrent = path;
            }
            if let Some(n) = t.processes {
                config.tools.processes = n;
            }
        }
        if let Some(t) = self.torrent {
            config.torrent.announce = t.announce.or(config.torrent.announce);
            if let Some(source) = t.source {
                config.torrent.source = source;
            }
            if let Some(len) = t.piece_length {
                config.torrent.piece_length = len;
            }
        }
        if let Some(l) = self.logging {
            if let Some(level) = l.level {
                config.log_level = level;
            }
            if let Some(format) = l.format {
                config.log_format = format;
            }
        }

        config
    }
}
