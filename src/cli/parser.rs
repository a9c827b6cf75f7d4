//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand, ValueEnum};

use super::commands;

/// Relation annotation CLI - candidate pairs, merge suggestions, scripted replay
#[derive(Parser)]
#[command(name = "kbpo")]
#[command(
    author,
    version,
    about = "Relation annotation CLI - candidate pairs, merge suggestions, scripted replay",
    long_about = r#"
kbpo - human-in-the-loop relation annotation

INPUTS:
  --document  tokenized document JSON: {"sentences": [[{"word", "span", "pos_tag"?}, ...], ...]}
  --mentions  stored mention list: [{"gloss", "type", "span", "entity": {...} | null}, ...]

EXAMPLES:
  kbpo relations --subject PER --object ORG
  kbpo pairs --document doc.json --mentions mentions.json --window 1
  kbpo suggest --document doc.json --mentions mentions.json --gloss "President Obama"
  kbpo replay --document doc.json --mentions mentions.json --actions actions.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List the relation catalog
    #[command(visible_alias = "r")]
    Relations(commands::RelationsArgs),

    /// Print the candidate-pair queue for a document
    #[command(visible_alias = "p")]
    Pairs(commands::PairsArgs),

    /// Rank existing entities as merge targets for a gloss
    #[command(visible_alias = "s")]
    Suggest(commands::SuggestArgs),

    /// Drive the workflow from a scripted action file
    Replay(commands::ReplayArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Human,
    /// JSON
    Json,
}
