//! Error types for kbpo-core.

use crate::entity::{EntityId, MentionId};
use thiserror::Error;

/// Result type for kbpo-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for kbpo-core operations.
///
/// Every variant is a local contract violation by the caller. None of them
/// are transient, so nothing here is worth retrying.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A mention span covers no tokens of the document.
    #[error("Empty span: [{begin}, {end}) covers no tokens")]
    EmptySpan {
        /// Start offset
        begin: usize,
        /// End offset
        end: usize,
    },

    /// A mention is already registered at this span.
    #[error("Duplicate mention at span [{begin}, {end})")]
    DuplicateMention {
        /// Start offset
        begin: usize,
        /// End offset
        end: usize,
    },

    /// No mention with this id exists in the session.
    #[error("Unknown mention: m-{0}")]
    UnknownMention(MentionId),

    /// No entity with this id exists in the session.
    #[error("Unknown entity: e-{0}")]
    UnknownEntity(EntityId),

    /// The mention has no type yet, so it cannot found an entity.
    #[error("Mention m-{0} has no type")]
    UntypedMention(MentionId),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an empty span error.
    #[must_use]
    pub fn empty_span(begin: usize, end: usize) -> Self {
        Self::EmptySpan { begin, end }
    }

    /// Create a duplicate mention error.
    #[must_use]
    pub fn duplicate_mention(begin: usize, end: usize) -> Self {
        Self::DuplicateMention { begin, end }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
