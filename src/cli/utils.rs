//! Utility functions for CLI commands

use crate::config::{AnnotationConfig, CandidatePolicy};
use kbpo_core::{AnnotationSession, Document, MentionRecord};

use super::commands::InputArgs;

/// Read input from file
pub fn read_input_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read file {}: {}", path, e))
}

/// Parse a JSON file into `T`
pub fn read_json<T: serde::de::DeserializeOwned>(path: &str, what: &str) -> Result<T, String> {
    let text = read_input_file(path)?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse {} JSON in {}: {}", what, path, e))
}

/// Build the session config: file first, then flag overrides
pub fn load_config(input: &InputArgs) -> Result<AnnotationConfig, String> {
    let mut config = match &input.config {
        Some(path) => AnnotationConfig::from_file(path)
            .map_err(|e| format!("Failed to load config {}: {}", path, e))?,
        None => AnnotationConfig::default(),
    };
    if let Some(window) = input.window {
        config = config.with_window(window);
    }
    if input.strict {
        let gpe = config.policy.gpe_subjects;
        config = config.with_policy(CandidatePolicy::strict().with_gpe_subjects(gpe));
    }
    if input.verify_links {
        config = config.with_verify_links(true);
    }
    Ok(config)
}

/// Load the document and replay the stored mentions into a fresh session
pub fn load_session(input: &InputArgs) -> Result<AnnotationSession, String> {
    let document: Document = read_json(&input.document, "document")?;
    let mut session = AnnotationSession::new(document);
    if let Some(path) = &input.mentions {
        let records: Vec<MentionRecord> = read_json(path, "mention list")?;
        for record in &records {
            if let Err(e) = session.load_mention(record) {
                log::warn!("dropping mention '{}' at {}: {}", record.gloss, record.span, e);
            }
        }
        log::info!(
            "loaded {} mentions into {} entities",
            session.mention_count(),
            session.entity_count()
        );
    }
    Ok(session)
}
