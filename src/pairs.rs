//! Candidate pair generation.
//!
//! Every typed mention is paired with the mentions that sit within a sentence
//! window of it. A pair `(m, n)` survives when
//!
//! 1. the [`CandidatePolicy`] lets `m.type` be a subject against `n.type`,
//! 2. the two mentions do not denote the same thing (same gloss, same entity,
//!    or the same non-empty external link),
//! 3. some catalog label applies to the type pair, and
//! 4. the unordered pair `{m, n}` has not been accepted already.
//!
//! The queue is built once per session; it is not incremental.

use crate::config::{AnnotationConfig, CandidatePolicy};
use crate::error::Result;
use crate::relation::RelationCatalog;
use kbpo_core::{AnnotationSession, Mention, MentionId, MentionRecord, MentionType};
use serde::{Deserialize, Serialize};

/// Position of a pair in the queue.
pub type PairId = usize;

/// A relation-annotation candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionPair {
    /// Position in the queue
    pub id: PairId,
    /// Subject mention
    pub subject: MentionId,
    /// Object mention
    pub object: MentionId,
    /// Chosen relation name, `None` while undecided
    pub relation: Option<String>,
}

impl MentionPair {
    /// Whether the pair covers mentions `a` and `b`, in either order.
    #[must_use]
    pub fn same_mentions(&self, a: MentionId, b: MentionId) -> bool {
        (self.subject == a && self.object == b) || (self.subject == b && self.object == a)
    }
}

/// Stored form of a candidate pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionPairRecord {
    /// Subject mention
    pub subject: MentionRecord,
    /// Object mention
    pub object: MentionRecord,
}

/// Builds the candidate-pair queue for a session.
#[derive(Debug, Clone)]
pub struct MentionPairGenerator<'a> {
    window: usize,
    policy: CandidatePolicy,
    catalog: &'a RelationCatalog,
}

impl Default for MentionPairGenerator<'static> {
    fn default() -> Self {
        Self::new(&AnnotationConfig::default())
    }
}

impl MentionPairGenerator<'static> {
    /// Create a generator over the built-in catalog.
    #[must_use]
    pub fn new(config: &AnnotationConfig) -> Self {
        Self {
            window: config.window,
            policy: config.policy,
            catalog: RelationCatalog::kbp(),
        }
    }
}

impl<'a> MentionPairGenerator<'a> {
    /// Use a different catalog for the applicability check.
    #[must_use]
    pub fn with_catalog<'b>(self, catalog: &'b RelationCatalog) -> MentionPairGenerator<'b> {
        MentionPairGenerator {
            window: self.window,
            policy: self.policy,
            catalog,
        }
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

    /// The sentence window.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Generate the queue from every mention in the session.
    ///
    /// Untyped mentions cannot be paired and are skipped.
    #[must_use]
    pub fn generate(&self, session: &AnnotationSession) -> Vec<MentionPair> {
        let mentions: Vec<(&Mention, MentionType)> = session
            .mentions_in_document_order()
            .into_iter()
            .filter_map(|m| match m.mention_type {
                Some(ty) => Some((m, ty)),
                None => {
                    log::warn!("skipping untyped mention m-{} '{}'", m.id, m.gloss);
                    None
                }
            })
            .collect();

        // Accepted pairs with their subject's sentence, for the backward dedup scan
        let mut accepted: Vec<(MentionPair, usize)> = Vec::new();

        for (i, &(m, m_type)) in mentions.iter().enumerate() {
            let (lo, hi) = self.window_bounds(&mentions, i);
            for (j, &(n, n_type)) in mentions.iter().enumerate().take(hi + 1).skip(lo) {
                if j == i || !self.is_candidate(session, (m, m_type), (n, n_type)) {
                    continue;
                }
                if self.already_accepted(&accepted, m, n) {
                    continue;
                }
                let pair = MentionPair {
                    id: accepted.len(),
                    subject: m.id,
                    object: n.id,
                    relation: None,
                };
                accepted.push((pair, m.sentence_index));
            }
        }

        log::debug!(
            "generated {} candidate pairs from {} mentions (window {})",
            accepted.len(),
            mentions.len(),
            self.window
        );
        accepted.into_iter().map(|(pair, _)| pair).collect()
    }

    /// Inclusive index range around `i` whose mentions lie within the window.
    /// Each direction stops at the first mention outside it.
    fn window_bounds(&self, mentions: &[(&Mention, MentionType)], i: usize) -> (usize, usize) {
        let s = mentions[i].0.sentence_index;
        let within = |j: usize| mentions[j].0.sentence_index.abs_diff(s) <= self.window;

        let mut lo = i;
        while lo > 0 && within(lo - 1) {
            lo -= 1;
        }
        let mut hi = i;
        while hi + 1 < mentions.len() && within(hi + 1) {
            hi += 1;
        }
        (lo, hi)
    }

    fn is_candidate(
        &self,
        session: &AnnotationSession,
        (m, m_type): (&Mention, MentionType),
        (n, n_type): (&Mention, MentionType),
    ) -> bool {
        if !self.policy.is_relation_candidate(m_type, n_type) {
            return false;
        }
        if m.gloss == n.gloss {
            return false;
        }
        if let (Some(a), Some(b)) = (m.entity, n.entity) {
            if a == b {
                return false;
            }
        }
        let link_of = |id| session.entity_of(id).and_then(|e| e.link.as_deref());
        if let (Some(a), Some(b)) = (link_of(m.id), link_of(n.id)) {
            if a == b {
                return false;
            }
        }
        self.catalog.is_applicable(m_type, n_type)
    }

    /// Scan accepted pairs newest first, stopping at the first one whose
    /// subject lies outside the window of both `m` and `n`.
    fn already_accepted(&self, accepted: &[(MentionPair, usize)], m: &Mention, n: &Mention) -> bool {
        for (pair, subject_sentence) in accepted.iter().rev() {
            let before = |s: usize| subject_sentence + self.window < s;
            if before(m.sentence_index) && before(n.sentence_index) {
                break;
            }
            if pair.same_mentions(m.id, n.id) {
                return true;
            }
        }
        false
    }
}

/// Build a queue from stored pairs, loading their mentions into the session.
///
/// Mentions are shared by span. Ids are sequential and every relation
/// starts undecided.
pub fn load_mention_pairs(
    session: &mut AnnotationSession,
    records: &[MentionPairRecord],
) -> Result<Vec<MentionPair>> {
    let mut pairs = Vec::with_capacity(records.len());
    for (id, record) in records.iter().enumerate() {
        let subject = session.load_mention(&record.subject)?;
        let object = session.load_mention(&record.object)?;
        pairs.push(MentionPair {
            id,
            subject,
            object,
            relation: None,
        });
    }
    log::debug!("loaded {} stored pairs", pairs.len());
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbpo_core::{Document, Span};

    // "Alice joined Acme. Bob"
    fn scenario() -> AnnotationSession {
        let doc = Document::from_json(
            r#"{"sentences": [
                [{"word": "Alice", "span": [0, 5]},
                 {"word": "joined", "span": [6, 12]},
                 {"word": "Acme", "span": [13, 17]},
                 {"word": ".", "span": [17, 18]}],
                [{"word": "Bob", "span": [19, 22]}]
            ]}"#,
        )
        .unwrap();
        let mut s = AnnotationSession::new(doc);
        for (b, e, ty) in [
            (0, 5, MentionType::Person),
            (13, 17, MentionType::Organization),
            (19, 22, MentionType::Person),
        ] {
            let id = s.create_mention(Span::new(b, e)).unwrap();
            s.set_mention_type(id, ty).unwrap();
            s.create_entity(id).unwrap();
        }
        s
    }

    fn glosses(s: &AnnotationSession, pairs: &[MentionPair]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|p| {
                (
                    s.mention(p.subject).unwrap().gloss.clone(),
                    s.mention(p.object).unwrap().gloss.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_window_one_scenario() {
        let s = scenario();
        let pairs = MentionPairGenerator::default().with_window(1).generate(&s);
        assert_eq!(
            glosses(&s, &pairs),
            vec![
                ("Alice".to_string(), "Acme".to_string()),
                ("Alice".to_string(), "Bob".to_string()),
                ("Acme".to_string(), "Bob".to_string()),
            ]
        );
        let ids: Vec<PairId> = pairs.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(pairs.iter().all(|p| p.relation.is_none()));
    }

    #[test]
    fn test_window_zero_stays_in_sentence() {
        let s = scenario();
        let pairs = MentionPairGenerator::default().with_window(0).generate(&s);
        assert_eq!(glosses(&s, &pairs), vec![("Alice".to_string(), "Acme".to_string())]);
    }

    #[test]
    fn test_strict_policy_drops_org_person() {
        let s = scenario();
        let pairs = MentionPairGenerator::default()
            .with_window(1)
            .with_policy(CandidatePolicy::strict())
            .generate(&s);
        // Acme -> Bob is gone; Bob -> Acme is the reverse of nothing accepted yet
        assert_eq!(
            glosses(&s, &pairs),
            vec![
                ("Alice".to_string(), "Acme".to_string()),
                ("Alice".to_string(), "Bob".to_string()),
                ("Bob".to_string(), "Acme".to_string()),
            ]
        );
    }

    #[test]
    fn test_untyped_mentions_skipped() {
        let mut s = scenario();
        s.create_mention(Span::new(6, 12)).unwrap();
        let pairs = MentionPairGenerator::default().with_window(1).generate(&s);
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_shared_link_is_self_relation() {
        let mut s = scenario();
        let alice = s.mention_at(Span::new(0, 5)).unwrap().entity.unwrap();
        let bob = s.mention_at(Span::new(19, 22)).unwrap().entity.unwrap();
        s.set_entity_link(alice, Some("wiki:Alice".into())).unwrap();
        s.set_entity_link(bob, Some("wiki:Alice".into())).unwrap();
        let pairs = MentionPairGenerator::default().with_window(1).generate(&s);
        assert_eq!(
            glosses(&s, &pairs),
            vec![
                ("Alice".to_string(), "Acme".to_string()),
                ("Acme".to_string(), "Bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_catalog_limits_pairs() {
        let s = scenario();
        let catalog = RelationCatalog::from_json(
            r#"[{"name": "per:employee_or_member_of", "short": "works for",
                 "template": "{subject} works for {object}.",
                 "subject-types": ["PER"], "object-types": ["ORG"]}]"#,
        )
        .unwrap();
        let pairs = MentionPairGenerator::default()
            .with_window(1)
            .with_catalog(&catalog)
            .generate(&s);
        assert_eq!(
            glosses(&s, &pairs),
            vec![
                ("Alice".to_string(), "Acme".to_string()),
                ("Bob".to_string(), "Acme".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_mention_pairs_shares_mentions() {
        let source = scenario();
        let pairs = MentionPairGenerator::default().with_window(1).generate(&source);
        let records: Vec<MentionPairRecord> = pairs
            .iter()
            .map(|p| MentionPairRecord {
                subject: source.mention_record(p.subject).unwrap(),
                object: source.mention_record(p.object).unwrap(),
            })
            .collect();

        let mut fresh = AnnotationSession::new(source.document().clone());
        let loaded = load_mention_pairs(&mut fresh, &records).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(fresh.mention_count(), 3);
        assert_eq!(fresh.entity_count(), 3);
        assert_eq!(glosses(&fresh, &loaded), glosses(&source, &pairs));
    }
}
