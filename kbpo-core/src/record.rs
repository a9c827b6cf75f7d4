//! Wire records for mentions and entities.
//!
//! ```json
//! { "gloss": "He", "type": "PER", "span": [40, 42],
//!   "entity": { "gloss": "Barack Obama", "type": "PER", "link": "wiki:Barack_Obama",
//!               "span": [0, 12], "canonicalCorrect": true, "linkGold": "wiki:Barack_Obama" } }
//! ```

use crate::entity::{Entity, MentionType, Span};
use serde::{Deserialize, Serialize};

/// Stored form of an entity, embedded in each of its mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Canonical gloss
    pub gloss: String,
    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: MentionType,
    /// External link
    #[serde(default)]
    pub link: Option<String>,
    /// Canonical span
    pub span: Span,
    /// Annotator verdict on the canonical mention
    #[serde(
        rename = "canonicalCorrect",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub canonical_correct: Option<bool>,
    /// Annotator-verified link
    #[serde(rename = "linkGold", default, skip_serializing_if = "Option::is_none")]
    pub link_gold: Option<String>,
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            gloss: entity.gloss.clone(),
            entity_type: entity.entity_type,
            link: entity.link.clone(),
            span: entity.span,
            canonical_correct: entity.canonical_correct,
            link_gold: entity.link_gold.clone(),
        }
    }
}

/// Stored form of a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    /// Surface text
    pub gloss: String,
    /// Mention type
    #[serde(rename = "type", default)]
    pub mention_type: Option<MentionType>,
    /// Character span
    pub span: Span,
    /// Owning entity, `null` when unresolved
    #[serde(default)]
    pub entity: Option<EntityRecord>,
}

impl MentionRecord {
    /// Effective type: the mention's own, else its entity's.
    #[must_use]
    pub fn effective_type(&self) -> Option<MentionType> {
        self.mention_type
            .or_else(|| self.entity.as_ref().map(|e| e.entity_type))
    }
}
