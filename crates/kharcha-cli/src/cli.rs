//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kharcha - Pull expenses out of chat messages, receipts and voice notes
#[derive(Parser)]
#[command(name = "kharcha")]
#[command(about = "Expense extraction from free text, receipts and transcripts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (overrides KHARCHA_CONFIG and the data dir override)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a single expense from a message
    Parse {
        /// Message text, e.g. "Spent 150 for biriyani"
        text: String,
    },

    /// Split a multi-expense message into expenses
    Split {
        /// Read the message from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Message text (stdin is read when neither text nor --file is given)
        text: Option<String>,
    },

    /// Analyze receipt text
    Receipt {
        /// Read the receipt text from a file (stdin otherwise)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the plain-text receipt rendering
        #[arg(long)]
        plain: bool,
    },

    /// Run OCR on a receipt image and record its expenses
    Ocr {
        /// Receipt image
        image: PathBuf,
    },

    /// Transcribe a voice note and record its expense
    Transcribe {
        /// Audio file
        audio: PathBuf,
    },

    /// List the category vocabulary, or one category's keywords
    Categories {
        /// Category name (case-insensitive)
        name: Option<String>,
    },

    /// Check an amount/category pair
    Validate {
        /// Expense amount
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Category label
        category: String,
    },

    /// Show the active configuration
    Config {
        /// Also run a health check against every extractor backend
        #[arg(long)]
        check: bool,
    },
}
