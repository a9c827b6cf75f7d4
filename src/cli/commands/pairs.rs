//! Pairs command - print the candidate-pair queue

use clap::Parser;
use serde::Serialize;

use super::super::output::{to_json, write_output};
use super::super::utils::{load_config, load_session};
use super::InputArgs;
use crate::pairs::MentionPairGenerator;
use kbpo_core::MentionRecord;

/// Print the candidate-pair queue for a document as JSON
#[derive(Parser, Debug)]
pub struct PairsArgs {
    /// Document, mentions and config
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the queue to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Serialize)]
struct PairView {
    id: usize,
    subject: MentionRecord,
    object: MentionRecord,
}

/// Run the pairs command
pub fn run(args: PairsArgs) -> Result<(), String> {
    let config = load_config(&args.input)?;
    let session = load_session(&args.input)?;
    let pairs = MentionPairGenerator::new(&config).generate(&session);

    let views = pairs
        .iter()
        .map(|p| {
            Ok(PairView {
                id: p.id,
                subject: session.mention_record(p.subject)?,
                object: session.mention_record(p.object)?,
            })
        })
        .collect::<Result<Vec<_>, kbpo_core::Error>>()
        .map_err(|e| e.to_string())?;

    write_output(&to_json(&views)?, args.output.as_deref())
}
