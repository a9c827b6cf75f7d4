//! Suggest command - rank entities as merge targets
//!
//! The candidate is either a free gloss or an existing mention picked by span.
//! Pronoun mentions get no suggestions.

use clap::Parser;
use serde::Serialize;

use super::super::output::{to_json, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{load_config, load_session};
use super::InputArgs;
use kbpo_core::Span;

/// Rank existing entities by word-level edit distance to a gloss
#[derive(Parser, Debug)]
pub struct SuggestArgs {
    /// Document, mentions and config
    #[command(flatten)]
    pub input: InputArgs,

    /// Candidate gloss
    #[arg(short, long, required_unless_present = "span")]
    pub gloss: Option<String>,

    /// Use the loaded mention at this span as the candidate
    #[arg(long, num_args = 2, value_names = ["BEGIN", "END"], conflicts_with = "gloss")]
    pub span: Option<Vec<usize>>,

    /// Drop entities scoring above this distance (overrides config)
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// Keep every ranked entity, ignoring any cutoff
    #[arg(long, conflicts_with = "max_distance")]
    pub all: bool,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct Suggestion<'a> {
    entity: String,
    gloss: &'a str,
    #[serde(rename = "type")]
    entity_type: String,
    score: usize,
}

/// Run the suggest command
pub fn run(args: SuggestArgs) -> Result<(), String> {
    let config = load_config(&args.input)?;
    let session = load_session(&args.input)?;
    let max = if args.all {
        None
    } else {
        args.max_distance.or(config.suggestion_max_distance)
    };

    let ranked = match (&args.span, &args.gloss) {
        (Some(span), _) => {
            let span = Span::new(span[0], span[1]);
            let mention = session
                .mention_at(span)
                .ok_or_else(|| format!("no mention at {}", span))?;
            session
                .suggest_for_mention(mention.id, max)
                .map_err(|e| e.to_string())?
        }
        (None, Some(gloss)) => session.suggest_entities(gloss, max),
        (None, None) => return Err("either --gloss or --span is required".to_string()),
    };

    let suggestions: Vec<Suggestion<'_>> = ranked
        .into_iter()
        .filter_map(|(id, score)| {
            session.entity(id).map(|e| Suggestion {
                entity: e.display_id(),
                gloss: &e.gloss,
                entity_type: e.entity_type.to_string(),
                score,
            })
        })
        .collect();

    let content = match args.format {
        OutputFormat::Json => to_json(&suggestions)?,
        OutputFormat::Human => suggestions
            .iter()
            .map(|s| format!("{}\t{}\t{}\t{}\n", s.entity, s.entity_type, s.score, s.gloss))
            .collect(),
    };
    write_output(&content, None)
}
