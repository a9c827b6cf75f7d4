//! kbpo - relation annotation CLI
//!
//! # Usage
//!
//! ```bash
//! # Relations a PER subject can hold toward an ORG object
//! kbpo relations --subject PER --object ORG
//!
//! # Candidate pairs within one sentence of each other
//! kbpo pairs --document doc.json --mentions mentions.json --window 1
//!
//! # Which entity should "the president" join?
//! kbpo suggest --document doc.json --mentions mentions.json --gloss "the president"
//!
//! # Replay an annotator session and print the relations
//! kbpo replay --document doc.json --mentions mentions.json --actions actions.json
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kbpo::cli::commands::{pairs, relations, replay, suggest};
use kbpo::cli::output::format_error;
use kbpo::cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Also installs the `log` bridge, so library records reach the subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (operation, result) = match cli.command {
        Commands::Relations(args) => ("relations", relations::run(args)),
        Commands::Pairs(args) => ("pairs", pairs::run(args)),
        Commands::Suggest(args) => ("suggest", suggest::run(args)),
        Commands::Replay(args) => ("replay", replay::run(args)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_error(operation, &e));
            ExitCode::FAILURE
        }
    }
}
