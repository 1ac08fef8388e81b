//! Catalogue API payloads

use serde::{Deserialize, Deserializer};

/// Envelope of every `ajax.php` response
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    pub response: Option<T>,
}

/// `action=torrentgroup` response body
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGroup {
    pub group: GroupInfo,
    #[serde(default)]
    pub torrents: Vec<ExistingVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// One already-published variant in a catalogue group
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingVariant {
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub format: String,
    /// "Lossless", "24bit Lossless", "V0 (VBR)", "320", ...
    #[serde(default)]
    pub encoding: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub remaster_title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub remaster_catalogue_number: Option<String>,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub remaster_year: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub remaster_record_label: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let year = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(year.filter(|y| *y != 0))
}
