//! Relations command - list the relation catalog

use clap::Parser;

use super::super::output::{to_json, write_output};
use super::super::parser::OutputFormat;
use crate::relation::{RelationCatalog, RelationLabel};
use kbpo_core::MentionType;

/// List the relation catalog, optionally filtered by applicability
#[derive(Parser, Debug)]
pub struct RelationsArgs {
    /// Only relations whose subject may have this type
    #[arg(long, value_name = "TYPE")]
    pub subject: Option<MentionType>,

    /// Only relations whose object may have this type
    #[arg(long, value_name = "TYPE")]
    pub object: Option<MentionType>,

    /// Read the catalog from a JSON file instead of the built-in one
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<String>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Run the relations command
pub fn run(args: RelationsArgs) -> Result<(), String> {
    let owned;
    let catalog = match &args.catalog {
        Some(path) => {
            let text = super::super::utils::read_input_file(path)?;
            owned = RelationCatalog::from_json(&text)
                .map_err(|e| format!("Failed to parse catalog {}: {}", path, e))?;
            &owned
        }
        None => RelationCatalog::kbp(),
    };

    let labels: Vec<&RelationLabel> = catalog
        .labels()
        .iter()
        .filter(|l| args.subject.map_or(true, |t| l.subject_types.contains(&t)))
        .filter(|l| args.object.map_or(true, |t| l.object_types.contains(&t)))
        .collect();

    let content = match args.format {
        OutputFormat::Json => to_json(&labels)?,
        OutputFormat::Human => labels
            .iter()
            .map(|l| format!("{:<28} {:<18} {}\n", l.name, l.short, l.template))
            .collect(),
    };
    write_output(&content, None)
}
