//! High-level pipeline: copy template → create empty slides → insert text.
//!
//! [`PresentationBuilder`] turns plain text into a populated presentation using
//! two batched mutation calls against a [`SlidesRemote`]:
//!   - Phase A creates one empty slide per chunk in a single batch.
//!   - Phase B fetches each created slide and inserts the chunk text into its
//!     first page element (the title placeholder of the layout), again in a
//!     single batch.
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first failing remote call aborts the build
//!   and is returned as a [`BuildError`] naming the stage.
//! - Keeps the i-th chunk paired with the slide created by the i-th request
//!   (see [`SlideChunk`]).
//! - No retries. Slides created before a Phase B failure are left in place
//!   unless [`BuilderConfig::rollback_on_failure`] is set.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chunker::{self, Chunk, TrailingChunk};
use crate::contract::{
    CreateSlideRequest, DeleteObjectRequest, InsertTextRequest, LayoutReference, RemoteError,
    Reply, Request, SlidesRemote,
};
use crate::error::BuildError;
use crate::presentation::Presentation;

/// Appended to the caller's prefix to name the copied file.
pub const TITLE_SUFFIX: &str = " - test slides";

/// Default predefined layout for created slides.
pub const DEFAULT_LAYOUT: &str = "TITLE";

/// Where new slides are inserted in the deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionOrder {
    /// Every create request uses index 0. Requests in a batch are applied one
    /// after another, so the new slides end up in reverse chunk order.
    #[default]
    Head,
    /// Request `i` uses index `i`; new slides appear in chunk order.
    Sequential,
}

impl InsertionOrder {
    fn index_for(self, position: usize) -> u32 {
        match self {
            InsertionOrder::Head => 0,
            InsertionOrder::Sequential => u32::try_from(position).unwrap_or(u32::MAX),
        }
    }
}

/// Static settings for a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// File copied as the starting point of every presentation.
    pub template_id: String,
    pub layout: String,
    pub insertion_order: InsertionOrder,
    pub trailing_chunk: TrailingChunk,
    /// Delete the slides created in Phase A when Phase B fails.
    pub rollback_on_failure: bool,
    /// Leave the slide of an empty chunk blank: no page fetch, no insert.
    /// The Slides API rejects an `insertText` whose text is empty, so with
    /// the default (`false`) a blank-line run or trailing blank line fails
    /// the whole Phase B batch.
    pub skip_empty_chunks: bool,
}

impl BuilderConfig {
    pub fn new(template_id: impl Into<String>) -> Self {
        BuilderConfig {
            template_id: template_id.into(),
            layout: DEFAULT_LAYOUT.to_string(),
            insertion_order: InsertionOrder::default(),
            trailing_chunk: TrailingChunk::default(),
            rollback_on_failure: false,
            skip_empty_chunks: false,
        }
    }
}

/// A chunk together with the slide created for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideChunk {
    pub chunk: Chunk,
    pub slide_id: String,
}

/// Pair chunks with created slide IDs positionally. Fails unless both sides
/// have the same length.
pub fn pair_slides(chunks: Vec<Chunk>, slide_ids: Vec<String>) -> Result<Vec<SlideChunk>, RemoteError> {
    if chunks.len() != slide_ids.len() {
        return Err(format!(
            "requested {} slides but the service reported {} created",
            chunks.len(),
            slide_ids.len()
        )
        .into());
    }
    Ok(chunks
        .into_iter()
        .zip(slide_ids)
        .map(|(chunk, slide_id)| SlideChunk { chunk, slide_id })
        .collect())
}

/// Collect the created slide IDs from a batch reply, skipping absent entries
/// and replies that carry no slide.
pub fn created_slide_ids(replies: Vec<Option<Reply>>) -> Vec<String> {
    replies
        .into_iter()
        .flatten()
        .filter_map(|reply| reply.create_slide)
        .map(|created| created.object_id)
        .collect()
}

fn new_slide_object_id() -> String {
    format!("slide-{}", Uuid::new_v4())
}

pub struct PresentationBuilder<R> {
    remote: R,
    config: BuilderConfig,
}

impl<R> PresentationBuilder<R>
where
    R: SlidesRemote,
{
    pub fn new(remote: R, config: BuilderConfig) -> Self {
        PresentationBuilder { remote, config }
    }

    /// Build a presentation titled `"<title_prefix> - test slides"` with one
    /// slide per chunk of `content`.
    pub async fn create_slides(
        &self,
        title_prefix: &str,
        content: &str,
    ) -> Result<Presentation, BuildError> {
        info!(template_id = %self.config.template_id, "[BUILD] Starting presentation build");

        let title = format!("{title_prefix}{TITLE_SUFFIX}");
        let copied = match self.remote.copy_file(&self.config.template_id, &title).await {
            Ok(file) => {
                info!(file_id = %file.id, title = %title, "[BUILD][COPY] Template copied");
                file
            }
            Err(e) => {
                error!(error = %e, template_id = %self.config.template_id, "[BUILD][ERROR][COPY] Template copy failed");
                return Err(BuildError::TemplateCopy {
                    template_id: self.config.template_id.clone(),
                    source: e,
                });
            }
        };

        let presentation_id = match self.remote.get_presentation(&copied.id).await {
            Ok(doc) => doc.presentation_id,
            Err(e) => {
                error!(error = %e, file_id = %copied.id, "[BUILD][ERROR][LOOKUP] Presentation lookup failed");
                return Err(BuildError::PresentationLookup {
                    file_id: copied.id,
                    source: e,
                });
            }
        };

        let chunks = chunker::split_with(content, self.config.trailing_chunk);
        info!(chunks = chunks.len(), %presentation_id, "[BUILD] Content split into chunks");

        let slides = self
            .create_empty_slides(&presentation_id, chunks)
            .await
            .map_err(|e| {
                error!(error = %e, %presentation_id, "[BUILD][ERROR][CREATE] Creating empty slides failed");
                BuildError::SlideCreation { source: e }
            })?;

        if let Err(e) = self.insert_text(&presentation_id, &slides).await {
            error!(error = %e, %presentation_id, "[BUILD][ERROR][INSERT] Inserting text failed");
            if self.config.rollback_on_failure {
                self.rollback(&presentation_id, &slides).await;
            }
            return Err(BuildError::TextInsertion { source: e });
        }

        info!(%presentation_id, slides = slides.len(), "[BUILD] Presentation build complete");
        Ok(Presentation::from_id(presentation_id))
    }

    /// Phase A: one create request per chunk, submitted in a single batch.
    async fn create_empty_slides(
        &self,
        presentation_id: &str,
        chunks: Vec<Chunk>,
    ) -> Result<Vec<SlideChunk>, RemoteError> {
        let requests: Vec<Request> = (0..chunks.len())
            .map(|position| {
                Request::CreateSlide(CreateSlideRequest {
                    object_id: new_slide_object_id(),
                    insertion_index: self.config.insertion_order.index_for(position),
                    slide_layout_reference: LayoutReference {
                        predefined_layout: self.config.layout.clone(),
                    },
                })
            })
            .collect();
        debug!(requests = requests.len(), "[BUILD][CREATE] Submitting create-slide batch");

        let replies = self.remote.batch_update(presentation_id, requests).await?;
        let slide_ids = created_slide_ids(replies);
        info!(created = slide_ids.len(), "[BUILD][CREATE] Empty slides created");

        pair_slides(chunks, slide_ids)
    }

    /// Phase B: insert each chunk's text into the first element of its slide,
    /// one fetch and one insert per chunk.
    async fn insert_text(
        &self,
        presentation_id: &str,
        slides: &[SlideChunk],
    ) -> Result<(), RemoteError> {
        let mut requests = Vec::with_capacity(slides.len());
        for slide in slides {
            if self.config.skip_empty_chunks && slide.chunk.is_empty() {
                debug!(slide_id = %slide.slide_id, "[BUILD][INSERT] Empty chunk, leaving slide blank");
                continue;
            }
            let page = self
                .remote
                .get_page(presentation_id, &slide.slide_id)
                .await
                .map_err(|e| -> RemoteError {
                    format!("failed to get slide {}: {e}", slide.slide_id).into()
                })?;
            let title_id = match page.page_elements.first() {
                Some(element) => element.object_id.clone(),
                None => {
                    return Err(format!("slide {} has no page elements", slide.slide_id).into());
                }
            };
            debug!(slide_id = %slide.slide_id, element_id = %title_id, "[BUILD][INSERT] Resolved title placeholder");
            requests.push(Request::InsertText(InsertTextRequest {
                object_id: title_id,
                insertion_index: 0,
                text: slide.chunk.text.clone(),
            }));
        }

        if requests.is_empty() {
            info!("[BUILD][INSERT] No text to insert");
            return Ok(());
        }

        let count = requests.len();
        self.remote
            .batch_update(presentation_id, requests)
            .await
            .map_err(|e| -> RemoteError { format!("failed to fill out slide content: {e}").into() })?;
        info!(inserted = count, "[BUILD][INSERT] Slide content filled out");
        Ok(())
    }

    async fn rollback(&self, presentation_id: &str, slides: &[SlideChunk]) {
        if slides.is_empty() {
            return;
        }
        let requests = slides
            .iter()
            .map(|slide| {
                Request::DeleteObject(DeleteObjectRequest {
                    object_id: slide.slide_id.clone(),
                })
            })
            .collect();
        match self.remote.batch_update(presentation_id, requests).await {
            Ok(_) => info!(deleted = slides.len(), "[BUILD][ROLLBACK] Removed created slides"),
            Err(e) => warn!(error = %e, "[BUILD][ROLLBACK] Failed to remove created slides"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_slide_ids_skip_absent_and_empty_replies() {
        let replies = vec![
            Some(Reply::created_slide("a")),
            None,
            Some(Reply::default()),
            Some(Reply::created_slide("b")),
        ];
        assert_eq!(created_slide_ids(replies), vec!["a", "b"]);
    }

    #[test]
    fn pairing_requires_equal_lengths() {
        let chunks = vec![Chunk::new("one\n"), Chunk::new("two\n")];
        assert!(pair_slides(chunks.clone(), vec!["s1".into()]).is_err());

        let paired = pair_slides(chunks, vec!["s1".into(), "s2".into()]).unwrap();
        assert_eq!(paired[0].slide_id, "s1");
        assert_eq!(paired[1].chunk.text, "two\n");
    }

    #[test]
    fn insertion_index_follows_order() {
        assert_eq!(InsertionOrder::Head.index_for(3), 0);
        assert_eq!(InsertionOrder::Sequential.index_for(3), 3);
    }

    #[test]
    fn slide_object_ids_are_unique_and_prefixed() {
        let a = new_slide_object_id();
        let b = new_slide_object_id();
        assert!(a.starts_with("slide-"));
        assert_ne!(a, b);
    }
}
