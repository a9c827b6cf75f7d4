//! Mention and entity types.
//!
//! # Hierarchy
//!
//! ```text
//! Entity (coreference cluster, "e-1")
//! ├── mentions[0]  canonical mention, founds the cluster
//! ├── mentions[1]  joined later
//! └── ...
//! ```
//!
//! A [`Mention`] is a typed span of the document. An [`Entity`] groups the
//! mentions that denote the same real-world referent and may carry an opaque
//! external `link` (e.g. `wiki:Barack_Obama`). Both live in an
//! [`AnnotationSession`](crate::AnnotationSession) arena and refer to each
//! other by id.

use serde::{Deserialize, Serialize};

/// Process-unique, monotonic mention identifier (scoped to a session).
pub type MentionId = u64;

/// Sequential, human-displayable entity index. The first entity is `1`.
pub type EntityId = u64;

// ============================================================================
// Mention Type
// ============================================================================

/// How an entity of a given type is linked to an external identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkingMethod {
    /// Search a wiki for a page id.
    WikiSearch,
    /// Pick a normalized date.
    DatePicker,
    /// No external link.
    None,
}

/// The fixed mention type enumeration.
///
/// Not user-extensible at runtime. `Number` only ever appears as an object
/// (e.g. `per:age`).
///
/// # Examples
///
/// ```rust
/// use kbpo_core::MentionType;
///
/// assert_eq!(MentionType::from_label("PERSON"), Some(MentionType::Person));
/// assert_eq!(MentionType::Gpe.as_label(), "GPE");
/// assert_eq!("LOC".parse::<MentionType>().unwrap(), MentionType::Gpe);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MentionType {
    /// Person (PER)
    Person,
    /// Organization (ORG)
    Organization,
    /// City, state or country (GPE)
    Gpe,
    /// Date expression (DATE)
    Date,
    /// Professional title (TITLE)
    Title,
    /// Number, e.g. an age (NUM)
    Number,
}

impl MentionType {
    /// All types, in display order.
    pub const ALL: [MentionType; 6] = [
        MentionType::Person,
        MentionType::Organization,
        MentionType::Gpe,
        MentionType::Date,
        MentionType::Title,
        MentionType::Number,
    ];

    /// Short label used on the wire.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            MentionType::Person => "PER",
            MentionType::Organization => "ORG",
            MentionType::Gpe => "GPE",
            MentionType::Date => "DATE",
            MentionType::Title => "TITLE",
            MentionType::Number => "NUM",
        }
    }

    /// Human-readable gloss.
    #[must_use]
    pub const fn gloss(&self) -> &'static str {
        match self {
            MentionType::Person => "Person",
            MentionType::Organization => "Organization",
            MentionType::Gpe => "City/State/Country",
            MentionType::Date => "Date",
            MentionType::Title => "Title",
            MentionType::Number => "Number",
        }
    }

    /// How entities of this type get their external link.
    #[must_use]
    pub const fn linking(&self) -> LinkingMethod {
        match self {
            MentionType::Person | MentionType::Organization | MentionType::Gpe => {
                LinkingMethod::WikiSearch
            }
            MentionType::Date => LinkingMethod::DatePicker,
            MentionType::Title | MentionType::Number => LinkingMethod::None,
        }
    }

    /// Parse a label. Accepts the short labels and the long aliases.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "PER" | "PERSON" => Some(MentionType::Person),
            "ORG" | "ORGANIZATION" => Some(MentionType::Organization),
            "GPE" | "LOC" | "LOCATION" => Some(MentionType::Gpe),
            "DATE" => Some(MentionType::Date),
            "TITLE" => Some(MentionType::Title),
            "NUM" | "NUMBER" => Some(MentionType::Number),
            _ => None,
        }
    }
}

impl std::fmt::Display for MentionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

impl std::str::FromStr for MentionType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| crate::Error::invalid_input(format!("unknown mention type '{}'", s)))
    }
}

impl TryFrom<String> for MentionType {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MentionType> for String {
    fn from(value: MentionType) -> Self {
        value.as_label().to_string()
    }
}

// ============================================================================
// Span
// ============================================================================

/// Half-open character offset pair `[begin, end)`.
///
/// Serializes as a two-element array, matching the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    /// Start offset (inclusive)
    pub begin: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Whether `other` lies entirely within this span.
    #[must_use]
    pub const fn contains(&self, other: &Span) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }

    /// Length in characters (0 for inverted spans).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Whether the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<(usize, usize)> for Span {
    fn from((begin, end): (usize, usize)) -> Self {
        Self { begin, end }
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.begin, span.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

// ============================================================================
// Mention
// ============================================================================

/// A typed span of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Unique id within the session
    pub id: MentionId,
    /// Character span
    pub span: Span,
    /// Type, once assigned. Equals the owning entity's type.
    pub mention_type: Option<MentionType>,
    /// Surface text
    pub gloss: String,
    /// Owning entity (non-owning back-reference)
    pub entity: Option<EntityId>,
    /// Sentence of the first covered token
    pub sentence_index: usize,
    /// POS tag of the head (first) token, if the document supplied one
    pub head_pos: Option<String>,
}

impl Mention {
    /// Whether the head token is tagged as a pronoun.
    #[must_use]
    pub fn is_pronoun(&self) -> bool {
        self.head_pos
            .as_deref()
            .is_some_and(crate::similarity::is_pronoun_tag)
    }
}

// ============================================================================
// Entity
// ============================================================================

/// A coreference cluster of mentions with one canonical mention.
///
/// `mentions[0]` is the canonical mention. The list is kept in join order and
/// is never empty while the entity is registered in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Sequential index, starting at 1
    pub id: EntityId,
    /// Type shared by every member
    pub entity_type: MentionType,
    /// Canonical gloss (from the founding mention)
    pub gloss: String,
    /// Canonical span (from the founding mention)
    pub span: Span,
    /// Members in join order
    pub mentions: Vec<MentionId>,
    /// Opaque external identifier
    pub link: Option<String>,
    /// Whether an annotator confirmed the canonical mention
    pub canonical_correct: Option<bool>,
    /// Link an annotator verified (`None` when unverified or not found)
    pub link_gold: Option<String>,
}

impl Entity {
    /// Display id, e.g. `e-3`.
    #[must_use]
    pub fn display_id(&self) -> String {
        format!("e-{}", self.id)
    }

    /// The founding mention.
    #[must_use]
    pub fn canonical_mention(&self) -> Option<MentionId> {
        self.mentions.first().copied()
    }

    /// Whether `mention` is the founding mention.
    #[must_use]
    pub fn is_canonical(&self, mention: MentionId) -> bool {
        self.canonical_mention() == Some(mention)
    }

    /// Number of member mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Whether the cluster has no members left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Whether the entity carries a non-empty external link.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_type_labels_round_trip() {
        for ty in MentionType::ALL {
            assert_eq!(MentionType::from_label(ty.as_label()), Some(ty));
        }
        assert_eq!(MentionType::from_label("organization"), Some(MentionType::Organization));
        assert_eq!(MentionType::from_label("NUMBER"), Some(MentionType::Number));
        assert_eq!(MentionType::from_label("MONEY"), None);
    }

    #[test]
    fn test_mention_type_serde_uses_labels() {
        let json = serde_json::to_string(&MentionType::Gpe).unwrap();
        assert_eq!(json, "\"GPE\"");
        let ty: MentionType = serde_json::from_str("\"PER\"").unwrap();
        assert_eq!(ty, MentionType::Person);
        assert!(serde_json::from_str::<MentionType>("\"FOO\"").is_err());
    }

    #[test]
    fn test_linking_method() {
        assert_eq!(MentionType::Person.linking(), LinkingMethod::WikiSearch);
        assert_eq!(MentionType::Date.linking(), LinkingMethod::DatePicker);
        assert_eq!(MentionType::Title.linking(), LinkingMethod::None);
    }

    #[test]
    fn test_span_serializes_as_pair() {
        let span = Span::new(3, 9);
        assert_eq!(serde_json::to_string(&span).unwrap(), "[3,9]");
        let back: Span = serde_json::from_str("[3,9]").unwrap();
        assert_eq!(back, span);
        assert!(span.contains(&Span::new(4, 9)));
        assert!(!span.contains(&Span::new(2, 5)));
    }

    #[test]
    fn test_pronoun_head() {
        let mut m = Mention {
            id: 0,
            span: Span::new(0, 2),
            mention_type: None,
            gloss: "He".into(),
            entity: None,
            sentence_index: 0,
            head_pos: Some("PRP".into()),
        };
        assert!(m.is_pronoun());
        m.head_pos = Some("NNP".into());
        assert!(!m.is_pronoun());
        m.head_pos = None;
        assert!(!m.is_pronoun());
    }
}
