//! # contract: remote presentation service interface
//!
//! This module defines the single trait ([`SlidesRemote`]) the builder talks to,
//! together with the request and reply types exchanged with it. The types mirror
//! the JSON shape of the Google Slides REST API, so an HTTP implementation can
//! serialise them directly.
//!
//! ## Interface & Extensibility
//! - Implement [`SlidesRemote`] for a concrete transport (see the `txt2slides`
//!   crate for the reqwest client).
//! - All methods are async and return [`RemoteError`], a boxed error, so any
//!   transport error can be surfaced without leaking its type.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockSlidesRemote` is exported with the
//!   `test-export-mocks` feature so downstream crates can script remote behaviour.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error returned by every remote call.
pub type RemoteError = Box<dyn std::error::Error + Send + Sync>;

/// The file produced by copying another file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A presentation document as resolved by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDocument {
    pub presentation_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A single page (slide) and its elements, in z-order as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
}

/// One mutation inside a batch update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlideRequest),
    InsertText(InsertTextRequest),
    DeleteObject(DeleteObjectRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    /// Caller-chosen ID for the new slide; must be unique within the presentation.
    pub object_id: String,
    pub insertion_index: u32,
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    /// Predefined layout name, e.g. `TITLE`.
    pub predefined_layout: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    /// The shape or table cell receiving the text.
    pub object_id: String,
    pub insertion_index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectRequest {
    pub object_id: String,
}

/// Reply to one request of a batch update. Requests without a reply payload
/// (such as text insertion) come back as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_slide: Option<CreateSlideReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideReply {
    pub object_id: String,
}

impl Reply {
    pub fn created_slide(object_id: impl Into<String>) -> Self {
        Reply {
            create_slide: Some(CreateSlideReply {
                object_id: object_id.into(),
            }),
        }
    }
}

/// Trait for the remote capabilities needed to build a presentation.
///
/// *NOTE:* implementors own authentication, timeouts and retry policy; callers
/// treat every call as a single blocking round-trip.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SlidesRemote: Send + Sync {
    /// Copy an existing file into a new one with the given title.
    async fn copy_file(&self, template_id: &str, new_title: &str)
        -> Result<FileHandle, RemoteError>;

    /// Resolve a file ID into a presentation document.
    async fn get_presentation(&self, file_id: &str) -> Result<PresentationDocument, RemoteError>;

    /// Apply all requests to the presentation in one call.
    ///
    /// Replies are positionally aligned with `requests`; entries may be absent.
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Request>,
    ) -> Result<Vec<Option<Reply>>, RemoteError>;

    /// Fetch one page of the presentation with its elements.
    async fn get_page(&self, presentation_id: &str, page_id: &str) -> Result<Page, RemoteError>;
}
