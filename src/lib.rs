//! # kbpo
//!
//! Human-in-the-loop relation annotation.
//!
//! - **Entities**: mentions clustered into coreferent entities (`kbpo_core`)
//! - **Relations**: the KBP relation vocabulary and its applicability rules
//! - **Pairs**: windowed, type-filtered, deduplicated candidate generation
//! - **Workflow**: a sequencer over the candidate queue with back/edit navigation
//!   and optional link verification
//!
//! ## Quick Start
//!
//! ```rust
//! use kbpo::prelude::*;
//!
//! let doc = Document::from_json(r#"{"sentences": [
//!     [{"word": "Alice", "span": [0, 5]}, {"word": "joined", "span": [6, 12]},
//!      {"word": "Acme", "span": [13, 17]}, {"word": ".", "span": [17, 18]}],
//!     [{"word": "Bob", "span": [19, 22]}]]}"#).unwrap();
//! let mut session = AnnotationSession::new(doc);
//! for (b, e, ty) in [
//!     (0, 5, MentionType::Person),
//!     (13, 17, MentionType::Organization),
//!     (19, 22, MentionType::Person),
//! ] {
//!     let m = session.create_mention(Span::new(b, e)).unwrap();
//!     session.set_mention_type(m, ty).unwrap();
//!     session.create_entity(m).unwrap();
//! }
//!
//! let config = AnnotationConfig::default().with_window(1);
//! let pairs = MentionPairGenerator::new(&config).generate(&session);
//! assert_eq!(pairs.len(), 3);
//! ```
//!
//! ## Flow
//!
//! ```text
//! Document ─▶ AnnotationSession ─▶ MentionPairGenerator ─▶ AnnotationWorkflow ─▶ [RelationRecord]
//!             (mentions, entities)   (candidate queue)       (RelationCatalog)
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod config;
mod error;
pub mod pairs;
pub mod relation;
pub mod workflow;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    pub use crate::config::{AnnotationConfig, CandidatePolicy};
    pub use crate::error::{Error, Result};
    pub use crate::pairs::{MentionPair, MentionPairGenerator};
    pub use crate::relation::{RelationCatalog, RelationLabel, NO_RELATION};
    pub use crate::workflow::{
        AnnotationWorkflow, LinkResolution, RelationRecord, VerificationRequest, WorkflowEvent,
        WorkflowState,
    };
    pub use kbpo_core::{AnnotationSession, Document, Entity, Mention, MentionType, Span};
}

// Re-exports
pub use config::{AnnotationConfig, CandidatePolicy};
pub use error::{Error, Result};
pub use pairs::{load_mention_pairs, MentionPair, MentionPairGenerator, MentionPairRecord, PairId};
pub use relation::{RelationCatalog, RelationLabel, NO_RELATION};
pub use workflow::{
    AnnotationWorkflow, LinkResolution, RelationRecord, Side, VerificationRequest, WorkflowEvent,
    WorkflowState,
};
