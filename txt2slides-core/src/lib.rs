#![doc = "txt2slides-core: core logic library for txt2slides."]

//! This crate contains the text chunking, the presentation build pipeline and
//! the remote service contract it runs against. Transport, authentication and
//! CLI code live in the `txt2slides` crate.
//!
//! # Usage
//! Implement [`contract::SlidesRemote`] for a transport, wrap it in a
//! [`builder::PresentationBuilder`] and call `create_slides`.

pub mod builder;
pub mod chunker;
pub mod contract;
pub mod error;
pub mod presentation;

pub use builder::{BuilderConfig, InsertionOrder, PresentationBuilder};
pub use chunker::{Chunk, TrailingChunk};
pub use error::{BuildError, Stage};
pub use presentation::Presentation;
