//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `expenses` - Message parsing commands (parse, split, validate)
//! - `receipts` - Receipt and voice commands (receipt, ocr, transcribe)
//! - `info` - Vocabulary and configuration listing (categories, config)

pub mod expenses;
pub mod info;
pub mod receipts;

// Re-export command functions for main.rs
pub use expenses::*;
pub use info::*;
pub use receipts::*;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Input text from the argument, else the file, else stdin
pub fn read_input(file: Option<&Path>, text: Option<&str>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
