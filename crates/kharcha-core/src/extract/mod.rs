//! Pluggable text extraction for receipt photos and voice notes
//!
//! Images and audio never reach the parsing core directly; an extractor turns
//! them into plain text first.
//!
//! # Architecture
//!
//! - `TextExtractor` trait: one operation, file path in, text out
//! - `ExtractorClient` enum: Clone + compile-time dispatch over the backends
//! - `ExtractorChain`: configured backends tried in order, each attempt bounded
//!   by a timeout and retried on failure
//!
//! Backends are chosen from `[[extractors.ocr]]` / `[[extractors.speech]]`
//! entries in the config, never by name lookup at call time.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = KharchaConfig::load(None)?;
//! let chain = ExtractorChain::ocr(&config.extractors);
//! let text = chain.extract(Path::new("receipt.jpg")).await?;
//! ```

mod command;
mod mock;
mod ollama;
mod tesseract;

pub use command::CommandBackend;
pub use mock::MockBackend;
pub use ollama::OllamaVisionBackend;
pub use tesseract::TesseractBackend;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{BackendSettings, ExtractorSettings};
use crate::error::{Error, Result};

/// A source of plain text for an image or audio file
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from the file; blank output is `Error::NoText`
    async fn extract_text(&self, path: &Path) -> Result<String>;

    /// Check if the backend can run at all
    async fn health_check(&self) -> bool;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}

/// Reject output that is empty once trimmed
pub(crate) fn non_blank(text: String, path: &Path) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(Error::NoText(path.to_path_buf()))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Concrete extractor enum
#[derive(Debug, Clone)]
pub enum ExtractorClient {
    Tesseract(TesseractBackend),
    /// Any external program (EasyOCR, PaddleOCR, whisper, ...)
    Command(CommandBackend),
    OllamaVision(OllamaVisionBackend),
    Mock(MockBackend),
}

impl ExtractorClient {
    /// Build the backend described by one config entry
    pub fn from_settings(settings: &BackendSettings) -> Self {
        match settings {
            BackendSettings::Tesseract { program, language } => {
                Self::Tesseract(TesseractBackend::new(program.as_deref(), language.as_deref()))
            }
            BackendSettings::Command { program, args } => {
                Self::Command(CommandBackend::new(program, args.clone()))
            }
            BackendSettings::OllamaVision { host, model } => Self::OllamaVision(
                OllamaVisionBackend::from_settings(host.as_deref(), model.as_deref()),
            ),
            BackendSettings::Mock { text } => Self::Mock(MockBackend::new(text)),
        }
    }
}

#[async_trait]
impl TextExtractor for ExtractorClient {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        match self {
            Self::Tesseract(b) => b.extract_text(path).await,
            Self::Command(b) => b.extract_text(path).await,
            Self::OllamaVision(b) => b.extract_text(path).await,
            Self::Mock(b) => b.extract_text(path).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Self::Tesseract(b) => b.health_check().await,
            Self::Command(b) => b.health_check().await,
            Self::OllamaVision(b) => b.health_check().await,
            Self::Mock(b) => b.health_check().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Tesseract(b) => b.name(),
            Self::Command(b) => b.name(),
            Self::OllamaVision(b) => b.name(),
            Self::Mock(b) => b.name(),
        }
    }
}

/// Ordered fallback list of extractors with timeout and retry
#[derive(Debug, Clone)]
pub struct ExtractorChain {
    backends: Vec<ExtractorClient>,
    timeout: Duration,
    max_retries: u32,
}

impl ExtractorChain {
    pub fn new(backends: Vec<ExtractorClient>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            backends,
            timeout,
            max_retries,
        }
    }

    /// OCR chain from config
    pub fn ocr(settings: &ExtractorSettings) -> Self {
        Self::from_entries(&settings.ocr, settings)
    }

    /// Speech-to-text chain from config
    pub fn speech(settings: &ExtractorSettings) -> Self {
        Self::from_entries(&settings.speech, settings)
    }

    fn from_entries(entries: &[BackendSettings], settings: &ExtractorSettings) -> Self {
        Self::new(
            entries.iter().map(ExtractorClient::from_settings).collect(),
            Duration::from_secs(settings.timeout_secs),
            settings.max_retries,
        )
    }

    pub fn backends(&self) -> &[ExtractorClient] {
        &self.backends
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// First non-blank text any backend produces for `path`
    ///
    /// Each backend gets `1 + max_retries` attempts, except that blank output
    /// moves straight on to the next backend. When every backend fails the
    /// last error is returned.
    pub async fn extract(&self, path: &Path) -> Result<String> {
        if self.backends.is_empty() {
            return Err(Error::Config("no text extractors configured".into()));
        }
        tokio::fs::metadata(path).await?;

        let mut last_error = None;
        for backend in &self.backends {
            for attempt in 0..=self.max_retries {
                debug!(backend = backend.name(), attempt, path = %path.display(), "Extracting text");

                let result = match tokio::time::timeout(self.timeout, backend.extract_text(path)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(self.timeout)),
                };

                match result {
                    Ok(text) => {
                        info!(backend = backend.name(), chars = text.len(), "Extracted text");
                        return Ok(text);
                    }
                    Err(e @ Error::NoText(_)) => {
                        warn!(backend = backend.name(), "No text extracted");
                        last_error = Some(e);
                        break;
                    }
                    Err(e) => {
                        warn!(backend = backend.name(), attempt, error = %e, "Extraction failed");
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::NoText(path.to_path_buf())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn input_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Biryani - 250\nTotal: 250.00").unwrap();
        file
    }

    fn chain(backends: Vec<ExtractorClient>) -> ExtractorChain {
        ExtractorChain::new(backends, Duration::from_secs(5), 1)
    }

    #[tokio::test]
    async fn test_chain_returns_first_success() {
        let file = input_file();
        let chain = chain(vec![
            ExtractorClient::Mock(MockBackend::new("Coffee - 30")),
            ExtractorClient::Mock(MockBackend::new("unused")),
        ]);
        assert_eq!(chain.extract(file.path()).await.unwrap(), "Coffee - 30");
    }

    #[tokio::test]
    async fn test_chain_falls_back_after_failures() {
        let file = input_file();
        let chain = chain(vec![
            ExtractorClient::Mock(MockBackend::failing()),
            ExtractorClient::Mock(MockBackend::new("   ")),
            ExtractorClient::Mock(MockBackend::new("Tea 20")),
        ]);
        assert_eq!(chain.extract(file.path()).await.unwrap(), "Tea 20");
    }

    #[tokio::test]
    async fn test_chain_reports_last_error() {
        let file = input_file();
        let chain = chain(vec![
            ExtractorClient::Mock(MockBackend::failing()),
            ExtractorClient::Mock(MockBackend::new("")),
        ]);
        assert!(matches!(
            chain.extract(file.path()).await,
            Err(Error::NoText(_))
        ));
    }

    #[tokio::test]
    async fn test_chain_missing_file() {
        let chain = chain(vec![ExtractorClient::Mock(MockBackend::new("x"))]);
        let result = chain.extract(Path::new("/nonexistent/receipt.jpg")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_empty_chain_is_config_error() {
        let file = input_file();
        let result = chain(vec![]).extract(file.path()).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_chain_times_out_slow_backend() {
        let file = input_file();
        let slow = ExtractorClient::Command(CommandBackend::new(
            "sh",
            vec!["-c".into(), "sleep 5".into(), "{input}".into()],
        ));
        let chain = ExtractorChain::new(vec![slow], Duration::from_millis(100), 0);
        assert!(matches!(
            chain.extract(file.path()).await,
            Err(Error::Timeout(_))
        ));
    }

    #[test]
    fn test_client_from_settings() {
        let client = ExtractorClient::from_settings(&BackendSettings::Command {
            program: "easyocr".into(),
            args: vec!["-f".into(), "{input}".into()],
        });
        assert_eq!(client.name(), "easyocr");

        let client = ExtractorClient::from_settings(&BackendSettings::Tesseract {
            program: None,
            language: Some("eng".into()),
        });
        assert_eq!(client.name(), "tesseract");
    }

    #[test]
    fn test_chain_from_default_config() {
        let config = crate::config::KharchaConfig::embedded().unwrap();
        let ocr = ExtractorChain::ocr(&config.extractors);
        let names: Vec<&str> = ocr.backends().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["tesseract", "easyocr"]);
        assert!(!ExtractorChain::speech(&config.extractors).is_empty());
    }
}
