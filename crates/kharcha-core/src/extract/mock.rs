//! Mock extractor for testing
//!
//! Returns fixed text regardless of the input file, or always fails.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{non_blank, TextExtractor};

#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    /// `None` makes every extraction fail
    text: Option<String>,
}

impl MockBackend {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    /// A backend that always fails with `Error::Extraction`
    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl TextExtractor for MockBackend {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        match &self.text {
            Some(text) => non_blank(text.clone(), path),
            None => Err(Error::Extraction("mock backend configured to fail".into())),
        }
    }

    async fn health_check(&self) -> bool {
        self.text.is_some()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
