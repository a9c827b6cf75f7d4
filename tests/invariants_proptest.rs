//! Property-based tests for clustering, pair generation and the workflow.
//!
//! Documents are synthetic: each token is a one-word mention candidate with a
//! gloss from a small vocabulary, so equal glosses and shared links occur often.

use std::collections::HashSet;

use kbpo::prelude::*;
use kbpo_core::{EntityId, MentionId};
use proptest::prelude::*;

const VOCAB: [&str; 6] = ["Alice", "Bob", "Acme", "Paris", "CEO", "2010"];
const LINKS: [Option<&str>; 3] = [None, Some("wiki:A"), Some("wiki:B")];

/// Build a document with the given sentence lengths. Token `i` has span
/// `[10 * i, 10 * i + 5)`, so tokens never touch.
fn document(sentence_lengths: &[usize], words: &[usize]) -> Document {
    let mut sentences = Vec::new();
    let mut i = 0;
    for &len in sentence_lengths {
        let mut tokens = Vec::new();
        for _ in 0..len {
            let word = VOCAB[words.get(i).copied().unwrap_or(0) % VOCAB.len()];
            tokens.push(serde_json::json!({"word": word, "span": [10 * i, 10 * i + 5]}));
            i += 1;
        }
        sentences.push(tokens);
    }
    Document::from_json(&serde_json::json!({ "sentences": sentences }).to_string()).unwrap()
}

fn token_span(i: usize) -> Span {
    Span::new(10 * i, 10 * i + 5)
}

/// One mention per chosen token, typed, clustered and linked per the plan.
fn session_from_plan(
    sentence_lengths: &[usize],
    words: &[usize],
    plan: &[(usize, usize, usize, usize)],
) -> AnnotationSession {
    let doc = document(sentence_lengths, words);
    let n = doc.token_count();
    let mut session = AnnotationSession::new(doc);
    let mut entities: Vec<EntityId> = Vec::new();

    for &(token, ty, join, link) in plan {
        let span = token_span(token % n);
        if session.mention_at(span).is_some() {
            continue;
        }
        let m = session.create_mention(span).unwrap();
        if join > 0 && !entities.is_empty() {
            let e = entities[join % entities.len()];
            session.add_mention(e, m).unwrap();
        } else {
            session
                .set_mention_type(m, MentionType::ALL[ty % MentionType::ALL.len()])
                .unwrap();
            let e = session.create_entity(m).unwrap();
            session
                .set_entity_link(e, LINKS[link % LINKS.len()].map(str::to_string))
                .unwrap();
            entities.push(e);
        }
    }
    session
}

fn arb_plan() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, Vec<(usize, usize, usize, usize)>)> {
    (
        prop::collection::vec(1usize..5, 1..6),
        prop::collection::vec(0usize..VOCAB.len(), 30),
        prop::collection::vec((0usize..30, 0usize..6, 0usize..4, 0usize..3), 0..20),
    )
}

#[derive(Debug, Clone)]
enum ClusterOp {
    Reassign(usize, usize),
    Detach(usize),
}

fn arb_cluster_op() -> impl Strategy<Value = ClusterOp> {
    prop_oneof![
        (0usize..20, 0usize..20).prop_map(|(m, e)| ClusterOp::Reassign(m, e)),
        (0usize..20).prop_map(ClusterOp::Detach),
    ]
}

fn check_clusters(session: &AnnotationSession) -> std::result::Result<(), TestCaseError> {
    for entity in session.entities() {
        let reachable = session
            .mentions()
            .any(|m| session.entity_of(m.id).map(|e| e.id) == Some(entity.id));
        prop_assert_eq!(reachable, !entity.is_empty(), "entity e-{}", entity.id);
        for &m in &entity.mentions {
            prop_assert_eq!(session.entity_of(m).map(|e| e.id), Some(entity.id));
            prop_assert_eq!(
                session.mention(m).unwrap().mention_type,
                Some(entity.entity_type)
            );
        }
    }
    Ok(())
}

proptest! {
    /// An entity is reachable through the lookup iff it has members, and every
    /// member carries the entity's type.
    #[test]
    fn clusters_stay_consistent(
        (lengths, words, plan) in arb_plan(),
        ops in prop::collection::vec(arb_cluster_op(), 0..30),
    ) {
        let mut session = session_from_plan(&lengths, &words, &plan);
        check_clusters(&session)?;

        for op in ops {
            let mentions: Vec<MentionId> = session.mentions().map(|m| m.id).collect();
            let entities: Vec<EntityId> = session.entities().map(|e| e.id).collect();
            if mentions.is_empty() {
                break;
            }
            match op {
                ClusterOp::Reassign(m, e) if !entities.is_empty() => {
                    let m = mentions[m % mentions.len()];
                    let e = entities[e % entities.len()];
                    // Moving a canonical mention out of a populated entity is refused
                    if let Ok(Some(emptied)) = session.reassign_mention(m, e) {
                        session.remove_entity(emptied).unwrap();
                    }
                }
                ClusterOp::Reassign(..) => {}
                ClusterOp::Detach(m) => {
                    let m = mentions[m % mentions.len()];
                    if let Some(e) = session.mention(m).unwrap().entity {
                        if let Ok(false) = session.remove_mention(e, m) {
                            session.remove_entity(e).unwrap();
                        }
                    }
                }
            }
            check_clusters(&session)?;
            for entity in session.entities() {
                prop_assert!(!entity.is_empty(), "emptied entity e-{} left registered", entity.id);
            }
        }
    }

    /// Generated queues: no duplicate unordered pair, sequential ids, window
    /// respected, no self-relations, policy respected.
    #[test]
    fn generated_pairs_are_well_formed(
        (lengths, words, plan) in arb_plan(),
        window in 0usize..3,
        strict in any::<bool>(),
    ) {
        let session = session_from_plan(&lengths, &words, &plan);
        let policy = if strict { CandidatePolicy::strict() } else { CandidatePolicy::lenient() };
        let config = AnnotationConfig::default().with_window(window).with_policy(policy);
        let pairs = MentionPairGenerator::new(&config).generate(&session);

        let mut seen = HashSet::new();
        for (i, pair) in pairs.iter().enumerate() {
            prop_assert_eq!(pair.id, i);
            prop_assert!(pair.relation.is_none());
            let key = (pair.subject.min(pair.object), pair.subject.max(pair.object));
            prop_assert!(seen.insert(key), "duplicate pair {:?}", key);

            let m = session.mention(pair.subject).unwrap();
            let n = session.mention(pair.object).unwrap();
            prop_assert!(m.sentence_index.abs_diff(n.sentence_index) <= window);
            prop_assert_ne!(&m.gloss, &n.gloss);
            prop_assert_ne!(m.entity, n.entity);

            let link_m = session.entity_of(m.id).and_then(|e| e.link.clone());
            let link_n = session.entity_of(n.id).and_then(|e| e.link.clone());
            if let (Some(a), Some(b)) = (link_m, link_n) {
                prop_assert_ne!(a, b);
            }

            let (mt, nt) = (m.mention_type.unwrap(), n.mention_type.unwrap());
            prop_assert!(policy.is_relation_candidate(mt, nt));
            prop_assert!(RelationCatalog::kbp().is_applicable(mt, nt));
        }
    }

    /// N choices with no edits take the workflow from Start to Done, and not sooner.
    #[test]
    fn workflow_terminates_after_n_choices(
        (lengths, words, plan) in arb_plan(),
        window in 0usize..3,
    ) {
        let mut session = session_from_plan(&lengths, &words, &plan);
        let config = AnnotationConfig::default().with_window(window);
        let pairs = MentionPairGenerator::new(&config).generate(&session);
        let n = pairs.len();
        prop_assume!(n > 0);

        let mut wf = AnnotationWorkflow::new(pairs, &config);
        wf.start().unwrap();
        for i in 0..n {
            prop_assert_eq!(wf.state(), WorkflowState::Presenting(i));
            wf.choose(&mut session, NO_RELATION).unwrap();
        }
        prop_assert_eq!(wf.state(), WorkflowState::Done);
    }

    /// Arbitrary back/edit detours never duplicate a pair in the output, and
    /// every pair ends up decided.
    #[test]
    fn relabeling_never_duplicates_output(
        edits in prop::collection::vec((0usize..6, any::<bool>()), 0..12),
    ) {
        let lengths = [4];
        let words = [0, 1, 2, 3];
        let plan: Vec<_> = (0..4).map(|t| (t, 0, 0, 0)).collect();
        let mut session = session_from_plan(&lengths, &words, &plan);
        let pairs = MentionPairGenerator::default().generate(&session);
        let n = pairs.len();
        let mut wf = AnnotationWorkflow::new(pairs, &AnnotationConfig::default());
        wf.start().unwrap();

        for (target, spouse) in edits {
            let relation = if spouse { "per:spouse" } else { "per:sibling" };
            if let WorkflowState::Presenting(_) = wf.state() {
                wf.choose(&mut session, relation).unwrap();
            }
            if wf.can_go_back() {
                let _ = wf.edit_previous(target);
            }
        }
        while let WorkflowState::Presenting(_) = wf.state() {
            wf.choose(&mut session, "per:spouse").unwrap();
        }

        prop_assert_eq!(wf.state(), WorkflowState::Done);
        let relations = wf.finalize(&session).unwrap();
        prop_assert_eq!(relations.len(), n);
        let spans: HashSet<_> = relations
            .iter()
            .map(|r| (r.subject.span, r.object.span))
            .collect();
        prop_assert_eq!(spans.len(), n);
    }
}
