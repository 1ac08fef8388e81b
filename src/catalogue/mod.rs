//! Remote catalogue access
//!
//! - Looking up a catalogue group by info hash
//! - Submitting an assembled release

pub mod client;
pub mod models;

pub use client::HttpCatalogue;
pub use models::{ExistingVariant, TorrentGroup};

use async_trait::async_trait;

use crate::error::Result;
use crate::release::SubmissionPayload;

/// The network side of a run
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Fetch the group the release with this info hash belongs to
    async fn torrent_group(&self, info_hash: &str) -> Result<TorrentGroup>;

    /// Submit a release; returns the service's response body
    async fn upload(&self, payload: &SubmissionPayload) -> Result<serde_json::Value>;
}
