//! Integration tests for candidate pair generation and merge suggestions.
//!
//! Each test pins its window and policy explicitly.

use kbpo::prelude::*;
use kbpo::{load_mention_pairs, MentionPairRecord};
use kbpo_core::MentionRecord;

// =============================================================================
// Fixtures
// =============================================================================

/// Two sentences: "Alice joined Acme." / "Bob left."
fn alice_acme_bob() -> AnnotationSession {
    let doc = Document::from_json(
        r#"{"sentences": [
            [{"word": "Alice", "span": [0, 5], "pos_tag": "NNP"},
             {"word": "joined", "span": [6, 12], "pos_tag": "VBD"},
             {"word": "Acme", "span": [13, 17], "pos_tag": "NNP"},
             {"word": ".", "span": [17, 18], "pos_tag": "."}],
            [{"word": "Bob", "span": [19, 22], "pos_tag": "NNP"},
             {"word": "left", "span": [23, 27], "pos_tag": "VBD"},
             {"word": ".", "span": [27, 28], "pos_tag": "."}]
        ]}"#,
    )
    .unwrap();
    let mut session = AnnotationSession::new(doc);
    for (b, e, ty) in [
        (0, 5, MentionType::Person),
        (13, 17, MentionType::Organization),
        (19, 22, MentionType::Person),
    ] {
        let m = session.create_mention(Span::new(b, e)).unwrap();
        session.set_mention_type(m, ty).unwrap();
        session.create_entity(m).unwrap();
    }
    session
}

fn gloss_pairs(session: &AnnotationSession, pairs: &[MentionPair]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|p| {
            (
                session.mention(p.subject).unwrap().gloss.clone(),
                session.mention(p.object).unwrap().gloss.clone(),
            )
        })
        .collect()
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_two_sentence_scenario_window_one() {
    let session = alice_acme_bob();
    let config = AnnotationConfig::default()
        .with_window(1)
        .with_policy(CandidatePolicy::lenient());
    let pairs = MentionPairGenerator::new(&config).generate(&session);

    assert_eq!(
        gloss_pairs(&session, &pairs),
        owned(&[("Alice", "Acme"), ("Alice", "Bob"), ("Acme", "Bob")])
    );
    // (Acme, Alice) was the reverse of an accepted pair
    assert!(!pairs
        .iter()
        .any(|p| session.mention(p.subject).unwrap().gloss == "Acme"
            && session.mention(p.object).unwrap().gloss == "Alice"));
}

#[test]
fn test_window_zero_drops_cross_sentence_pairs() {
    let session = alice_acme_bob();
    let config = AnnotationConfig::default().with_window(0);
    let pairs = MentionPairGenerator::new(&config).generate(&session);
    assert_eq!(gloss_pairs(&session, &pairs), owned(&[("Alice", "Acme")]));
}

#[test]
fn test_mentions_of_one_entity_never_pair() {
    let mut session = alice_acme_bob();
    // Fold Bob into Alice's entity
    let alice = session.mention_at(Span::new(0, 5)).unwrap().id;
    let bob = session.mention_at(Span::new(19, 22)).unwrap().id;
    let e_alice = session.entity_of(alice).unwrap().id;
    let emptied = session.reassign_mention(bob, e_alice).unwrap();
    if let Some(e) = emptied {
        session.remove_entity(e).unwrap();
    }

    let config = AnnotationConfig::default().with_window(1);
    let pairs = MentionPairGenerator::new(&config).generate(&session);
    assert_eq!(
        gloss_pairs(&session, &pairs),
        owned(&[("Alice", "Acme"), ("Acme", "Bob")])
    );
}

#[test]
fn test_identical_glosses_never_pair() {
    let doc = Document::from_json(
        r#"{"sentences": [[
            {"word": "Paris", "span": [0, 5]},
            {"word": "and", "span": [6, 9]},
            {"word": "Paris", "span": [10, 15]}
        ]]}"#,
    )
    .unwrap();
    let mut session = AnnotationSession::new(doc);
    for (b, e) in [(0, 5), (10, 15)] {
        let m = session.create_mention(Span::new(b, e)).unwrap();
        session.set_mention_type(m, MentionType::Person).unwrap();
        session.create_entity(m).unwrap();
    }
    let pairs = MentionPairGenerator::default().generate(&session);
    assert!(pairs.is_empty());
}

#[test]
fn test_gpe_subjects_are_configurable() {
    let doc = Document::from_json(
        r#"{"sentences": [[
            {"word": "France", "span": [0, 6]},
            {"word": "joined", "span": [7, 13]},
            {"word": "NATO", "span": [14, 18]}
        ]]}"#,
    )
    .unwrap();
    let mut session = AnnotationSession::new(doc);
    for (b, e, ty) in [(0, 6, MentionType::Gpe), (14, 18, MentionType::Organization)] {
        let m = session.create_mention(Span::new(b, e)).unwrap();
        session.set_mention_type(m, ty).unwrap();
        session.create_entity(m).unwrap();
    }

    let base = AnnotationConfig::default();
    let pairs = MentionPairGenerator::new(&base).generate(&session);
    assert_eq!(gloss_pairs(&session, &pairs), owned(&[("NATO", "France")]));

    let gpe = base.with_policy(CandidatePolicy::lenient().with_gpe_subjects(true));
    let pairs = MentionPairGenerator::new(&gpe).generate(&session);
    // France -> NATO is accepted first, NATO -> France is then its reverse
    assert_eq!(gloss_pairs(&session, &pairs), owned(&[("France", "NATO")]));
}

#[test]
fn test_stored_pairs_round_trip_through_json() {
    let session = alice_acme_bob();
    let config = AnnotationConfig::default().with_window(1);
    let pairs = MentionPairGenerator::new(&config).generate(&session);

    let records: Vec<MentionPairRecord> = pairs
        .iter()
        .map(|p| MentionPairRecord {
            subject: session.mention_record(p.subject).unwrap(),
            object: session.mention_record(p.object).unwrap(),
        })
        .collect();
    let json = serde_json::to_string(&records).unwrap();
    let parsed: Vec<MentionPairRecord> = serde_json::from_str(&json).unwrap();

    let mut fresh = AnnotationSession::new(session.document().clone());
    let loaded = load_mention_pairs(&mut fresh, &parsed).unwrap();
    assert_eq!(gloss_pairs(&fresh, &loaded), gloss_pairs(&session, &pairs));
    assert!(loaded.iter().enumerate().all(|(i, p)| p.id == i && p.relation.is_none()));
}

// =============================================================================
// Suggestions
// =============================================================================

#[test]
fn test_pronoun_mentions_do_not_anchor_suggestions() {
    let doc = Document::from_json(
        r#"{"sentences": [
            [{"word": "Obama", "span": [0, 5], "pos_tag": "NNP"},
             {"word": "spoke", "span": [6, 11], "pos_tag": "VBD"}],
            [{"word": "He", "span": [12, 14], "pos_tag": "PRP"},
             {"word": "left", "span": [15, 19], "pos_tag": "VBD"}]
        ]}"#,
    )
    .unwrap();
    let mut session = AnnotationSession::new(doc);
    let obama = session.create_mention(Span::new(0, 5)).unwrap();
    session.set_mention_type(obama, MentionType::Person).unwrap();
    let e = session.create_entity(obama).unwrap();
    let he = session.create_mention(Span::new(12, 14)).unwrap();
    session.add_mention(e, he).unwrap();

    // Scored against "obama" only; the two words share no letters
    assert_eq!(session.suggestion_score(e, "president").unwrap(), Some(9));
    assert_eq!(session.suggestion_score(e, "President Obama").unwrap(), Some(0));
    // "he" would score 1 against "the"; the pronoun is ignored
    assert_eq!(session.suggestion_score(e, "the").unwrap(), Some(5));
}

#[test]
fn test_loaded_mentions_keep_their_clusters() {
    let mut session = alice_acme_bob();
    let alice = session.mention_at(Span::new(0, 5)).unwrap().id;
    let e = session.entity_of(alice).unwrap().id;
    session
        .set_entity_link(e, Some("wiki:Alice_Liddell".into()))
        .unwrap();

    let records: Vec<MentionRecord> = session.entity_annotations();
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json[0]["entity"]["link"], "wiki:Alice_Liddell");
    assert_eq!(json[1]["type"], "ORG");

    let mut fresh = AnnotationSession::new(session.document().clone());
    for r in &records {
        fresh.load_mention(r).unwrap();
    }
    assert_eq!(fresh.entity_count(), 3);
    let ranked = fresh.suggest_entities("Alice", Some(0));
    assert_eq!(ranked.len(), 1);
    assert_eq!(
        fresh.entity(ranked[0].0).unwrap().link.as_deref(),
        Some("wiki:Alice_Liddell")
    );
}
