//! Relation vocabulary.
//!
//! A [`RelationCatalog`] is an ordered, read-only table of [`RelationLabel`]s.
//! The built-in catalog ([`RelationCatalog::kbp`]) is the KBP slot-filling
//! vocabulary: `no_relation`, then the `per:*` and `org:*` relations.
//!
//! Hosts can supply their own table in the same JSON shape:
//!
//! ```json
//! [ { "name": "per:spouse", "short": "spouse",
//!     "template": "{subject} is the spouse of {object}.",
//!     "subject-types": ["PER"], "object-types": ["PER"] } ]
//! ```

use crate::error::{Error, Result};
use crate::pairs::MentionPair;
use kbpo_core::{AnnotationSession, MentionId, MentionType};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Name of the "no relation" sentinel.
pub const NO_RELATION: &str = "no_relation";

/// One entry of the relation vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLabel {
    /// Relation name, e.g. `per:spouse`
    pub name: String,
    /// Short human-readable form
    pub short: String,
    /// Sentence template with `{subject}`/`{object}` placeholders
    pub template: String,
    /// Example sentences
    #[serde(default)]
    pub examples: Vec<String>,
    /// Allowed subject types
    #[serde(rename = "subject-types")]
    pub subject_types: Vec<MentionType>,
    /// Allowed object types
    #[serde(rename = "object-types")]
    pub object_types: Vec<MentionType>,
}

impl RelationLabel {
    /// Whether the label applies to a `subject` → `object` type pair.
    #[must_use]
    pub fn is_applicable(&self, subject: MentionType, object: MentionType) -> bool {
        self.subject_types.contains(&subject) && self.object_types.contains(&object)
    }

    /// Whether this is the "no relation" sentinel.
    #[must_use]
    pub fn is_no_relation(&self) -> bool {
        self.name == NO_RELATION
    }

    /// Fill the template with the given glosses.
    #[must_use]
    pub fn fill(&self, subject: &str, object: &str) -> String {
        self.template
            .replace("{subject}", subject)
            .replace("{object}", object)
    }
}

/// Ordered relation vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationCatalog {
    labels: Vec<RelationLabel>,
}

static KBP: Lazy<RelationCatalog> = Lazy::new(build_kbp);

impl RelationCatalog {
    /// Build a catalog from labels, in the given order.
    #[must_use]
    pub fn new(labels: Vec<RelationLabel>) -> Self {
        Self { labels }
    }

    /// The built-in KBP catalog.
    #[must_use]
    pub fn kbp() -> &'static RelationCatalog {
        &KBP
    }

    /// Parse a catalog from its JSON array form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All labels in catalog order.
    #[must_use]
    pub fn labels(&self) -> &[RelationLabel] {
        &self.labels
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Look up a label by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RelationLabel> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Look up a label by name, failing with [`Error::UnknownRelation`].
    pub fn require(&self, name: &str) -> Result<&RelationLabel> {
        self.get(name).ok_or_else(|| Error::unknown_relation(name))
    }

    /// Labels applicable to a `subject` → `object` type pair, in catalog order.
    pub fn candidates(
        &self,
        subject: MentionType,
        object: MentionType,
    ) -> impl Iterator<Item = &RelationLabel> {
        self.labels
            .iter()
            .filter(move |l| l.is_applicable(subject, object))
    }

    /// Whether any label applies to the type pair.
    #[must_use]
    pub fn is_applicable(&self, subject: MentionType, object: MentionType) -> bool {
        self.candidates(subject, object).next().is_some()
    }

    /// Render the relation `name` for `pair` as plain text.
    ///
    /// With `use_link`, each side shows its entity's canonical gloss when it
    /// has one, else the mention's own gloss.
    pub fn render(
        &self,
        name: &str,
        session: &AnnotationSession,
        pair: &MentionPair,
        use_link: bool,
    ) -> Result<String> {
        let label = self.require(name)?;
        let subject = side_gloss(session, pair.subject, use_link)?;
        let object = side_gloss(session, pair.object, use_link)?;
        Ok(label.fill(&subject, &object))
    }
}

fn side_gloss(session: &AnnotationSession, id: MentionId, use_link: bool) -> Result<String> {
    let mention = session
        .mention(id)
        .ok_or(kbpo_core::Error::UnknownMention(id))?;
    let entity_gloss = session
        .entity_of(id)
        .map(|e| e.gloss.as_str())
        .filter(|g| use_link && !g.is_empty());
    Ok(entity_gloss.unwrap_or(&mention.gloss).to_string())
}

// =============================================================================
// Built-in KBP table
// =============================================================================

fn label(
    name: &str,
    short: &str,
    template: &str,
    subjects: &[MentionType],
    objects: &[MentionType],
    examples: &[&str],
) -> RelationLabel {
    RelationLabel {
        name: name.to_string(),
        short: short.to_string(),
        template: template.to_string(),
        examples: examples.iter().map(|e| (*e).to_string()).collect(),
        subject_types: subjects.to_vec(),
        object_types: objects.to_vec(),
    }
}

fn build_kbp() -> RelationCatalog {
    use MentionType::{Date, Gpe, Number, Organization as Org, Person as Per, Title};

    RelationCatalog::new(vec![
        label(
            NO_RELATION,
            "unrelated",
            "{subject} and {object} are otherwise related or not related.",
            &[Per, Org, Gpe],
            &[Per, Org, Gpe, Date, Number, Title],
            &[
                "{Tony Blair} informed the [British] public on Thursday.",
                "{Binney} as accosted by an [FBI] agent.",
            ],
        ),
        // per:*
        label("per:age", "age", "{subject} is {object} old.", &[Per], &[Number], &[]),
        label(
            "per:alternate_names",
            "alias",
            "{subject} is also known as {object}.",
            &[Per],
            &[Per],
            &["{Dwayne Johnson}, popularly known as [The Rock], ..."],
        ),
        label(
            "per:place_of_birth",
            "born at",
            "{subject} was born at {object}.",
            &[Per],
            &[Gpe],
            &["{Julia} is a [Hawaiian] native."],
        ),
        label(
            "per:place_of_residence",
            "lived at",
            "{subject} lived at {object}.",
            &[Per],
            &[Gpe],
            &["{Mike} lived in [Hawaii] because he grew up or studied there."],
        ),
        label(
            "per:place_of_death",
            "died at",
            "{subject} died at {object}.",
            &[Per],
            &[Gpe],
            &["{Mike} was mourned in [Philadelphia] where he died last weekend."],
        ),
        label(
            "per:date_of_birth",
            "born on",
            "{subject} was born on {object}.",
            &[Per],
            &[Date],
            &["{Mike} was born on [December 31st, 1975]."],
        ),
        label(
            "per:date_of_death",
            "died on",
            "{subject} died on {object}.",
            &[Per],
            &[Date],
            &["{Mike} died on [December 31st, 2015]."],
        ),
        label(
            "per:organizations_founded",
            "founded by",
            "{subject} founded {object}.",
            &[Per],
            &[Org],
            &["{Steve Jobs} founded [Apple Inc.] in 1976."],
        ),
        label(
            "per:holds_shares_in",
            "holds shares in",
            "{subject} holds shares in {object}.",
            &[Per],
            &[Org],
            &["{Eric Schmidt} a the leading shareholder in [Google]."],
        ),
        label(
            "per:schools_attended",
            "studied at",
            "{subject} studied at {object}.",
            &[Per],
            &[Org],
            &["{Eric Schmidt}, an [UC Berkeley]-graduate ..."],
        ),
        label(
            "per:employee_or_member_of",
            "works for",
            "{subject} works for {object}.",
            &[Per],
            &[Org, Gpe],
            &["{Mike} is for [Shell] if he is Shell's spokesperson."],
        ),
        label(
            "per:parents",
            "child of",
            "{subject} is the child of {object}.",
            &[Per],
            &[Per],
            &["{Fisher}'s mother, [Debbie Reynolds]."],
        ),
        label(
            "per:children",
            "parent of",
            "{subject} is the parent of {object}.",
            &[Per],
            &[Per],
            &["{Debbie Reynolds} said [her daughter] was in a better place now."],
        ),
        label(
            "per:spouse",
            "spouse",
            "{subject} is the spouse of {object}.",
            &[Per],
            &[Per],
            &["{Barack Obama} thanked his wife, [Michelle]."],
        ),
        label(
            "per:sibling",
            "sibling of",
            "{subject} is the sibling of {object}.",
            &[Per],
            &[Per],
            &["Obama said he was proud of his daughters {Malia} and [Sasha]."],
        ),
        label(
            "per:other_family",
            "other family",
            "{subject} and {object} are otherwise family.",
            &[Per],
            &[Per],
            &["Grandparents, cousins and uncles would be considered as other family."],
        ),
        label(
            "per:title",
            "professional title",
            "{subject} is a {object}.",
            &[Per],
            &[Title],
            &["Official [spokesperson] {Shayne Williams}"],
        ),
        // org:*
        label(
            "org:alternate_names",
            "alias",
            "{subject} is also known as {object}.",
            &[Org],
            &[Org],
            &["{Quantum Computer Services} was renamed [America Online]"],
        ),
        label(
            "org:place_of_headquarters",
            "headquartered at",
            "{subject} is headquartered at {object}.",
            &[Org],
            &[Gpe],
            &["[Singapore]-based {Flextronics}..."],
        ),
        label(
            "org:date_founded",
            "founded on",
            "{subject} was founded on {object}.",
            &[Org],
            &[Date],
            &["Steve Jobs founded {Apple Inc.} in [1976]."],
        ),
        label(
            "org:date_dissolved",
            "dissolved on",
            "{subject} was closed/dissolved on {object}.",
            &[Org],
            &[Date],
            &["{Lehman Brothers} was sold to Nomura and Barclays in [2008]."],
        ),
        label(
            "org:founded_by",
            "founded by",
            "{subject} was founded by {object}.",
            &[Org],
            &[Org, Gpe],
            &["{The association} was started by [Walmart]."],
        ),
        label(
            "org:member_of",
            "member of",
            "{subject} is a member of {object}, though {subject} can operate independently of {object}.",
            &[Org],
            &[Org, Gpe],
            &["{Golden State Warriors} is a member of the [NBA]."],
        ),
        label(
            "org:members",
            "has member",
            "{subject} has {object} as a member, though {object} can operate independently of {subject}.",
            &[Org],
            &[Org, Gpe],
            &["The {United Nations} has the [United States] as a member"],
        ),
        label(
            "org:subsidiaries",
            "parent of",
            "{subject} owns {object} and {object} can not exist without {subject}.",
            &[Org],
            &[Org],
            &["{Fox Entertainment Group} is the parent of [Fox News]."],
        ),
        label(
            "org:parents",
            "subsidiary of",
            "{subject} is a subsidiary of {object} and {subject} can not exist without {object}.",
            &[Org],
            &[Org, Gpe],
            &["The {Department of Homeland Security} is a subsidiary of the [U.S.]."],
        ),
        label(
            "org:shareholders",
            "shareholder",
            "{object} is a shareholder of {subject}.",
            &[Org],
            &[Org],
            &[],
        ),
        label(
            "org:holds_shares_in",
            "holds shares in",
            "{subject} holds shares in {object}.",
            &[Org],
            &[Org],
            &[],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kbp_catalog_shape() {
        let catalog = RelationCatalog::kbp();
        assert_eq!(catalog.len(), 29);
        assert_eq!(catalog.labels()[0].name, NO_RELATION);
        let per = catalog.labels().iter().filter(|l| l.name.starts_with("per:")).count();
        let org = catalog.labels().iter().filter(|l| l.name.starts_with("org:")).count();
        assert_eq!((per, org), (17, 11));
    }

    #[test]
    fn test_candidates_in_catalog_order() {
        let catalog = RelationCatalog::kbp();
        let names: Vec<&str> = catalog
            .candidates(MentionType::Person, MentionType::Date)
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec![NO_RELATION, "per:date_of_birth", "per:date_of_death"]);
    }

    #[test]
    fn test_applicability() {
        let catalog = RelationCatalog::kbp();
        let age = catalog.get("per:age").unwrap();
        assert!(age.is_applicable(MentionType::Person, MentionType::Number));
        assert!(!age.is_applicable(MentionType::Organization, MentionType::Number));
        // no_relation keeps ORG -> PER reachable
        assert!(catalog.is_applicable(MentionType::Organization, MentionType::Person));
        assert!(!catalog.is_applicable(MentionType::Date, MentionType::Person));
    }

    #[test]
    fn test_unknown_relation() {
        let catalog = RelationCatalog::kbp();
        assert!(matches!(catalog.require("per:pet"), Err(Error::UnknownRelation(_))));
    }

    #[test]
    fn test_fill_replaces_every_placeholder() {
        let catalog = RelationCatalog::kbp();
        let text = catalog.get("org:member_of").unwrap().fill("Warriors", "NBA");
        assert_eq!(
            text,
            "Warriors is a member of NBA, though Warriors can operate independently of NBA."
        );
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = RelationCatalog::from_json(
            r#"[{"name": "per:pet", "short": "owns pet", "template": "{subject} owns {object}.",
                 "icon": "fa-paw", "subject-types": ["PER"], "object-types": ["PERSON", "ORG"]}]"#,
        )
        .unwrap();
        let pet = catalog.get("per:pet").unwrap();
        assert!(pet.examples.is_empty());
        assert_eq!(pet.object_types, vec![MentionType::Person, MentionType::Organization]);
    }
}
