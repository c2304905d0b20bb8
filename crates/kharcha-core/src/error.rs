//! Error types for Kharcha
//!
//! Extraction itself never fails: a missing amount is `None`, an invalid
//! expense is `false`. These variants cover configuration problems and the
//! external OCR/speech backends.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("No text extracted from {}", .0.display())]
    NoText(PathBuf),

    #[error("Text extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, Error>;
