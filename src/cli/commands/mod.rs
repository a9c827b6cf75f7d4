//! Command implementations for kbpo CLI
//!
//! Each command has its own module/file.

use clap::Args;

pub mod pairs;
pub mod relations;
pub mod replay;
pub mod suggest;

// Re-export argument types for parser
pub use pairs::PairsArgs;
pub use relations::RelationsArgs;
pub use replay::ReplayArgs;
pub use suggest::SuggestArgs;

/// Document, mention and configuration inputs shared by the session commands
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Tokenized document JSON
    #[arg(short, long, value_name = "PATH")]
    pub document: String,

    /// Stored mention list JSON
    #[arg(short, long, value_name = "PATH")]
    pub mentions: Option<String>,

    /// Annotation config JSON
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Sentence window for candidate pairs (overrides config)
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Do not pair ORG subjects with PER objects
    #[arg(long)]
    pub strict: bool,

    /// Verify canonical mentions and links before committing relations
    #[arg(long)]
    pub verify_links: bool,
}
