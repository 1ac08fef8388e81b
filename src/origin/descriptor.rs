//! Origin descriptor reader
//!
//! Parses the `origin.yaml` file written next to a downloaded release. Keys
//! follow the gazelle-origin layout (`Edition year`, `Catalog number`, ...);
//! values that should be text or years may show up as YAML strings, numbers
//! or nulls, so those fields are deserialized leniently.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::error::{Result, TranscodeError};

use super::EditionIdentity;

/// File name of the descriptor inside a release directory
pub const ORIGIN_FILE_NAME: &str = "origin.yaml";

/// Source format that transcodes are made from
pub const LOSSLESS_FORMAT: &str = "FLAC";

/// Encoding string of a 24-bit lossless source
pub const ENCODING_24BIT_LOSSLESS: &str = "24bit Lossless";

/// One file listed in the descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OriginFile {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Size", alias = "size", default)]
    pub size: Option<u64>,
}

/// Immutable facts about a candidate release
#[derive(Debug, Clone, Deserialize)]
pub struct OriginDescriptor {
    #[serde(rename = "Artist", alias = "artist")]
    pub artist: String,

    /// Release title
    #[serde(rename = "Name", alias = "name")]
    pub name: String,

    #[serde(rename = "Media", alias = "media")]
    pub media: String,

    #[serde(rename = "Format", alias = "format")]
    pub format: String,

    #[serde(rename = "Encoding", alias = "encoding")]
    pub encoding: String,

    /// Edition title, e.g. "Deluxe Edition"
    #[serde(
        rename = "Edition",
        alias = "edition",
        default,
        deserialize_with = "lenient_string"
    )]
    pub edition: Option<String>,

    #[serde(
        rename = "Edition year",
        alias = "Edition Year",
        alias = "edition_year",
        default,
        deserialize_with = "lenient_year"
    )]
    pub edition_year: Option<u32>,

    #[serde(
        rename = "Original year",
        alias = "Original Year",
        alias = "original_year",
        default,
        deserialize_with = "lenient_year"
    )]
    pub original_year: Option<u32>,

    #[serde(
        rename = "Catalog number",
        alias = "Catalog Number",
        alias = "catalog_number",
        default,
        deserialize_with = "lenient_string"
    )]
    pub catalog_number: Option<String>,

    #[serde(
        rename = "Record label",
        alias = "Record Label",
        alias = "record_label",
        default,
        deserialize_with = "lenient_string"
    )]
    pub record_label: Option<String>,

    /// Hash identifying the catalogue group
    #[serde(rename = "Info hash", alias = "Info Hash", alias = "info_hash")]
    pub info_hash: String,

    #[serde(rename = "Permalink", alias = "permalink")]
    pub permalink: String,

    #[serde(rename = "Files", alias = "files", default)]
    pub files: Vec<OriginFile>,
}

impl OriginDescriptor {
    /// Read `origin.yaml` from a release directory
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::from_file(dir.as_ref().join(ORIGIN_FILE_NAME))
    }

    /// Read a descriptor file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranscodeError::Origin {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| TranscodeError::Origin {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse descriptor text
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Whether this release is in the lossless source format
    pub fn is_lossless_source(&self) -> bool {
        self.format == LOSSLESS_FORMAT
    }

    /// Whether the source is 24-bit lossless
    pub fn is_24bit_lossless(&self) -> bool {
        self.encoding == ENCODING_24BIT_LOSSLESS
    }

    /// Year of this edition, falling back to the original release year
    pub fn year(&self) -> Option<u32> {
        self.edition_year.or(self.original_year)
    }

    /// Project the matching key for this edition
    pub fn edition_identity(&self) -> EditionIdentity {
        EditionIdentity {
            media: self.media.clone(),
            remaster_title: self.edition.clone(),
            remaster_catalogue_number: self.catalog_number.clone(),
            remaster_year: self.year(),
            remaster_record_label: self.record_label.clone(),
        }
    }

    /// Paths of the FLAC files listed in the descriptor, relative to `dir`
    pub fn flac_paths(&self, dir: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| f.name.ends_with(".flac"))
            .map(|f| dir.join(&f.name))
            .collect()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_yaml::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    let year = match value {
        serde_yaml::Value::Number(n) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
        serde_yaml::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(year.filter(|y| *y != 0))
}
