//! Google Drive + Slides REST client implementing the core `SlidesRemote` contract.
//!
//! # Remote client (CLI <-> Core)
//!
//! This module wires [`txt2slides_core::contract::SlidesRemote`] to the real
//! Google APIs:
//!
//! - `copy_file` → Drive v3 `files.copy`
//! - `get_presentation` → Slides v1 `presentations.get`
//! - `batch_update` → Slides v1 `presentations.batchUpdate`
//! - `get_page` → Slides v1 `presentations.pages.get`
//!
//! Construct [`GoogleSlidesClient`] with an OAuth access token (see
//! [`crate::oauth`]). Base URLs are configurable so the client can be pointed
//! at a local server in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use txt2slides_core::contract::{
    FileHandle, Page, PresentationDocument, RemoteError, Reply, Request, SlidesRemote,
};

/// Tracing target for Google API calls.
pub const TRACING_TARGET: &str = "txt2slides::google";

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";
pub const SLIDES_API_BASE: &str = "https://slides.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleClientConfig {
    pub drive_base_url: String,
    pub slides_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GoogleClientConfig {
    fn default() -> Self {
        GoogleClientConfig {
            drive_base_url: DRIVE_API_BASE.to_string(),
            slides_base_url: SLIDES_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("txt2slides/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Non-success response from a Google API.
#[derive(Debug, Error)]
#[error("{endpoint} returned HTTP {status}: {message}")]
pub struct GoogleApiError {
    pub endpoint: String,
    pub status: u16,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct CopyFileBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct BatchUpdateBody {
    requests: Vec<Request>,
}

#[derive(Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Option<Reply>>,
}

pub struct GoogleSlidesClient {
    http: Client,
    access_token: String,
    config: GoogleClientConfig,
}

impl std::fmt::Debug for GoogleSlidesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSlidesClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GoogleSlidesClient {
    pub fn new(
        access_token: impl Into<String>,
        config: GoogleClientConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        tracing::debug!(
            target: TRACING_TARGET,
            drive = %config.drive_base_url,
            slides = %config.slides_base_url,
            "Created Google API client"
        );
        Ok(GoogleSlidesClient {
            http,
            access_token: access_token.into(),
            config,
        })
    }

    fn drive_url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        api_url(&self.config.drive_base_url, &["drive", "v3"], segments)
    }

    fn slides_url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        api_url(&self.config.slides_base_url, &["v1"], segments)
    }

    /// Sends an authorised request and decodes a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request.bearer_auth(&self.access_token).send().await.map_err(|e| {
            tracing::error!(target: TRACING_TARGET, error = %e, endpoint, "Request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or(body);
            tracing::error!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                endpoint,
                message = %message,
                "Google API error"
            );
            return Err(Box::new(GoogleApiError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Appends `prefix` and `segments` to `base`, percent-encoding each segment so
/// that IDs containing `/`, `?` or `#` stay inside their own path segment.
fn api_url(base: &str, prefix: &[&str], segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| -> RemoteError { format!("base URL {base} cannot carry a path").into() })?
        .pop_if_empty()
        .extend(prefix)
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl SlidesRemote for GoogleSlidesClient {
    async fn copy_file(
        &self,
        template_id: &str,
        new_title: &str,
    ) -> Result<FileHandle, RemoteError> {
        tracing::info!(target: TRACING_TARGET, template_id, title = new_title, "Copying template file");
        let request = self
            .http
            .post(self.drive_url(&["files", template_id, "copy"])?)
            .query(&[("fields", "id,name"), ("supportsAllDrives", "true")])
            .json(&CopyFileBody { name: new_title });
        let file: FileHandle = self.send_json("drive.files.copy", request).await?;
        tracing::info!(target: TRACING_TARGET, file_id = %file.id, "Template copied");
        Ok(file)
    }

    async fn get_presentation(&self, file_id: &str) -> Result<PresentationDocument, RemoteError> {
        tracing::debug!(target: TRACING_TARGET, file_id, "Fetching presentation");
        let request = self
            .http
            .get(self.slides_url(&["presentations", file_id])?)
            .query(&[("fields", "presentationId,title")]);
        self.send_json("slides.presentations.get", request).await
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Request>,
    ) -> Result<Vec<Option<Reply>>, RemoteError> {
        tracing::info!(
            target: TRACING_TARGET,
            presentation_id,
            requests = requests.len(),
            "Submitting batch update"
        );
        let method = format!("{presentation_id}:batchUpdate");
        let request = self
            .http
            .post(self.slides_url(&["presentations", method.as_str()])?)
            .json(&BatchUpdateBody { requests });
        let response: BatchUpdateResponse = self
            .send_json("slides.presentations.batchUpdate", request)
            .await?;
        tracing::debug!(target: TRACING_TARGET, replies = response.replies.len(), "Batch update applied");
        Ok(response.replies)
    }

    async fn get_page(&self, presentation_id: &str, page_id: &str) -> Result<Page, RemoteError> {
        tracing::debug!(target: TRACING_TARGET, presentation_id, page_id, "Fetching page");
        let request = self
            .http
            .get(self.slides_url(&["presentations", presentation_id, "pages", page_id])?);
        self.send_json("slides.presentations.pages.get", request).await
    }
}
