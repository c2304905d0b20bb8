//! Kharcha CLI - Expense extraction
//!
//! Usage:
//!   kharcha parse "Spent 150 for biriyani"   Parse one expense
//!   kharcha split --file day.txt             Split a multi-expense message
//!   kharcha receipt --file bill.txt --plain  Analyze receipt text
//!   kharcha ocr bill.jpg                     OCR a receipt image and record items

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use kharcha_core::KharchaConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config =
        KharchaConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Parse { text } => commands::cmd_parse(&config, &text, cli.json),
        Commands::Split { file, text } => {
            commands::cmd_split(&config, file.as_deref(), text.as_deref(), cli.json)
        }
        Commands::Receipt { file, plain } => {
            commands::cmd_receipt(&config, file.as_deref(), plain, cli.json)
        }
        Commands::Ocr { image } => commands::cmd_ocr(&config, &image, cli.json).await,
        Commands::Transcribe { audio } => {
            commands::cmd_transcribe(&config, &audio, cli.json).await
        }
        Commands::Categories { name } => {
            commands::cmd_categories(&config, name.as_deref(), cli.json)
        }
        Commands::Validate { amount, category } => {
            commands::cmd_validate(&config, amount, &category, cli.json)
        }
        Commands::Config { check } => commands::cmd_config(&config, check, cli.json).await,
    }
}
