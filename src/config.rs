//! Configuration for pair generation and the annotation workflow.
//!
//! ```json
//! { "window": 1, "policy": { "org_person_objects": false }, "verify_links": true }
//! ```
//!
//! Every field is optional on the wire; missing ones take their defaults.

use crate::error::Result;
use kbpo_core::MentionType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which mention types may act as a relation subject, and against which objects.
///
/// PER subjects always pair with any object. ORG subjects never take a TITLE
/// object. Every other type is never a subject unless `gpe_subjects` is set,
/// in which case GPE follows the ORG rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatePolicy {
    /// ORG subjects may take PER objects
    pub org_person_objects: bool,
    /// GPE mentions may be subjects (under the ORG rule)
    pub gpe_subjects: bool,
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self::lenient()
    }
}

impl CandidatePolicy {
    /// ORG may take PER objects; GPE is never a subject.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            org_person_objects: true,
            gpe_subjects: false,
        }
    }

    /// ORG may not take PER objects; GPE is never a subject.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            org_person_objects: false,
            gpe_subjects: false,
        }
    }

    /// Let GPE mentions act as subjects.
    #[must_use]
    pub const fn with_gpe_subjects(mut self, enabled: bool) -> Self {
        self.gpe_subjects = enabled;
        self
    }

    /// Directional eligibility of `subject` → `object`, keyed on the subject type.
    #[must_use]
    pub fn is_relation_candidate(&self, subject: MentionType, object: MentionType) -> bool {
        let org_rule = |object: MentionType| match object {
            MentionType::Title => false,
            MentionType::Person => self.org_person_objects,
            _ => true,
        };
        match subject {
            MentionType::Person => true,
            MentionType::Organization => org_rule(object),
            MentionType::Gpe if self.gpe_subjects => org_rule(object),
            _ => false,
        }
    }
}

/// Configuration for an annotation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Maximum sentence distance between the two mentions of a candidate pair
    pub window: usize,
    /// Subject/object eligibility rule
    pub policy: CandidatePolicy,
    /// Walk the canonical-mention and link checks before committing a relation
    pub verify_links: bool,
    /// Drop merge suggestions scoring above this distance; `None` keeps all
    pub suggestion_max_distance: Option<usize>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            window: 0,
            policy: CandidatePolicy::lenient(),
            verify_links: false,
            suggestion_max_distance: Some(2),
        }
    }
}

impl AnnotationConfig {
    /// Read a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the sentence window.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the candidate policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable link verification.
    #[must_use]
    pub fn with_verify_links(mut self, enabled: bool) -> Self {
        self.verify_links = enabled;
        self
    }

    /// Set the suggestion cutoff.
    #[must_use]
    pub fn with_suggestion_max_distance(mut self, max: Option<usize>) -> Self {
        self.suggestion_max_distance = max;
        self
    }
}
