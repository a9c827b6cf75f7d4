//! Error types for kbpo.

use thiserror::Error;

/// Result type for kbpo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for kbpo operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Mention/entity model error.
    #[error(transparent)]
    Core(#[from] kbpo_core::Error),

    /// Workflow transition requested from a state that cannot accept it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Relation name not present in the catalog.
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// Relation exists but does not apply to the pair's types.
    #[error("Relation {relation} does not apply to {subject} -> {object}")]
    InapplicableRelation {
        /// Relation name
        relation: String,
        /// Subject type label
        subject: String,
        /// Object type label
        object: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create an unknown relation error.
    pub fn unknown_relation(name: impl Into<String>) -> Self {
        Error::UnknownRelation(name.into())
    }
}
