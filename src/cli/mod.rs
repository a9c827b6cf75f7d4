//! CLI library modules for the kbpo binary.
//!
//! Commands return `Result<(), String>` so they can be tested without a
//! process boundary; the binary turns errors into `ERROR: ...` lines.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use parser::{Cli, Commands, OutputFormat};
