//! # kbpo-core
//!
//! Core annotation state for kbpo: mentions, coreference entities, and the
//! session arena that owns them.
//!
//! This crate provides:
//! - **Types**: `Mention`, `Entity`, `MentionType`, `Span`
//! - **Documents**: `Document`, `Token` (tokenized, sentence-split input)
//! - **Session**: `AnnotationSession` (clustering, merge suggestions, records)
//! - **Records**: `MentionRecord`, `EntityRecord` (the stored JSON form)
//!
//! The relation catalog, pair generation and the annotation workflow live in
//! the `kbpo` crate and build on these types.

#![warn(missing_docs)]

pub mod document;
pub mod entity;
pub mod error;
pub mod record;
pub mod session;
pub mod similarity;

// Re-exports for convenience
pub use document::{gloss_from_tokens, Document, Token, TokenRef};
pub use entity::{Entity, EntityId, LinkingMethod, Mention, MentionId, MentionType, Span};
pub use error::{Error, Result};
pub use record::{EntityRecord, MentionRecord};
pub use session::AnnotationSession;
