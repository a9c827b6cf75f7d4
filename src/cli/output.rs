//! Output formatting utilities for CLI commands

use std::io::{self, Write};

use serde::Serialize;

/// Format error message for display
pub fn format_error(operation: &str, details: &str) -> String {
    format!("ERROR: {} - {}", operation, details)
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Pretty-print a value as JSON, with a trailing newline
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {}", e))
}
