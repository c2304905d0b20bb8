//! Tesseract OCR backend (`tesseract <image> stdout`)

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

use super::command::run_program;
use super::{non_blank, TextExtractor};

const DEFAULT_PROGRAM: &str = "tesseract";

#[derive(Debug, Clone)]
pub struct TesseractBackend {
    program: String,
    language: Option<String>,
}

impl TesseractBackend {
    pub fn new(program: Option<&str>, language: Option<&str>) -> Self {
        Self {
            program: program.unwrap_or(DEFAULT_PROGRAM).to_string(),
            language: language.map(str::to_string),
        }
    }

    fn args_for(&self, path: &Path) -> Vec<String> {
        let mut args = vec![path.display().to_string(), "stdout".to_string()];
        if let Some(lang) = &self.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        args
    }
}

#[async_trait]
impl TextExtractor for TesseractBackend {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let stdout = run_program(&self.program, &self.args_for(path)).await?;
        non_blank(stdout, path)
    }

    async fn health_check(&self) -> bool {
        run_program(&self.program, &["--version".to_string()])
            .await
            .is_ok()
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
