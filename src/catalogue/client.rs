//! HTTP client for the catalogue's `ajax.php` API

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{CatalogueError, Result};
use crate::release::{FormValue, SubmissionPayload};

use super::models::{ApiEnvelope, TorrentGroup};
use super::Catalogue;

/// Sent as the user agent on every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION"));

const TORRENT_MIME: &str = "application/x-bittorrent";

/// Catalogue reached over HTTPS with an API token
pub struct HttpCatalogue {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpCatalogue {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(CatalogueError::from)?;
        Ok(Self::with_client(client, api_url, api_key))
    }

    pub fn with_client(client: Client, api_url: &str, api_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Catalogue for HttpCatalogue {
    async fn torrent_group(&self, info_hash: &str) -> Result<TorrentGroup> {
        tracing::debug!("Querying torrent group for hash {}", info_hash);
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("action", "torrentgroup"), ("hash", info_hash)])
            .header(AUTHORIZATION, &self.api_key)
            .send()
            .await
            .map_err(CatalogueError::from)?;

        decode_envelope("torrentgroup", response).await
    }

    async fn upload(&self, payload: &SubmissionPayload) -> Result<serde_json::Value> {
        let form = build_form(payload).await?;
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("action", "upload")])
            .header(AUTHORIZATION, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(CatalogueError::from)?;

        decode_envelope("upload", response).await
    }
}

/// Turn a payload's flat fields into a multipart form. Fields that would
/// be falsy on the wire are left out.
pub async fn build_form(payload: &SubmissionPayload) -> Result<Form> {
    let mut form = Form::new();
    for field in payload.form_fields() {
        if !field.is_sent() {
            continue;
        }
        form = match field.value {
            FormValue::Text(text) => {
                tracing::info!("  {} = {}", field.name, text);
                form.text(field.name, text)
            }
            FormValue::Flag(flag) => form.text(field.name, flag.to_string()),
            FormValue::File(path) => {
                let bytes = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.torrent".to_string());
                tracing::info!("  {} = {:?}", field.name, path);
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(TORRENT_MIME)
                    .map_err(CatalogueError::from)?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// Decode an API envelope, mapping failures to errors.
///
/// Client errors still carry a JSON envelope with the reason; server
/// errors do not.
async fn decode_envelope<T: DeserializeOwned>(
    action: &'static str,
    response: Response,
) -> Result<T> {
    let status = response.status();
    if status.is_server_error() {
        return Err(CatalogueError::Status { action, status }.into());
    }

    let body = response.text().await.map_err(CatalogueError::from)?;
    let envelope: ApiEnvelope<serde_json::Value> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(CatalogueError::Status { action, status }.into())
        }
        Err(e) => {
            return Err(CatalogueError::Malformed {
                action,
                reason: e.to_string(),
            }
            .into())
        }
    };

    if envelope.status != "success" {
        return Err(CatalogueError::Rejected {
            action,
            status: envelope.status,
            error: envelope.error.unwrap_or_default(),
        }
        .into());
    }

    let response = envelope.response.ok_or_else(|| CatalogueError::Malformed {
        action,
        reason: "missing response".to_string(),
    })?;
    serde_json::from_value(response).map_err(|e| {
        CatalogueError::Malformed {
            action,
            reason: e.to_string(),
        }
        .into()
    })
}
