//! Ollama vision backend
//!
//! Sends the receipt image, base64 encoded, to a local vision model through
//! Ollama's `/api/generate` endpoint and returns the transcribed text.
//!
//! Host and model come from the config entry, then `OLLAMA_HOST` /
//! `OLLAMA_MODEL`, then the defaults below.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::{non_blank, TextExtractor};

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llava";

const TRANSCRIBE_PROMPT: &str = "Transcribe all text on this receipt exactly as printed, \
one receipt line per output line. Keep item names, quantities and prices on the same line. \
Output only the text, with no commentary.";

/// Request to Ollama API with images (for vision models)
#[derive(Debug, Serialize)]
struct OllamaVisionRequest {
    model: String,
    prompt: String,
    images: Vec<String>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaVisionBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaVisionBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Config values first, then environment, then defaults
    pub fn from_settings(host: Option<&str>, model: Option<&str>) -> Self {
        let host = host
            .map(str::to_string)
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var("OLLAMA_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self::new(&host, &model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TextExtractor for OllamaVisionBackend {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let image_data = tokio::fs::read(path).await?;
        let base64_image = base64::engine::general_purpose::STANDARD.encode(&image_data);

        let request = OllamaVisionRequest {
            model: self.model.clone(),
            prompt: TRANSCRIBE_PROMPT.to_string(),
            images: vec![base64_image],
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(
            model = %self.model,
            chars = ollama_response.response.len(),
            "Ollama vision response"
        );

        non_blank(ollama_response.response, path)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "ollama_vision"
    }
}
