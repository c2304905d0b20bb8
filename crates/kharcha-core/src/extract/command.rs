//! External program backend
//!
//! Runs any OCR or speech-to-text CLI that prints text on stdout. The
//! placeholder `{input}` in the argument list is replaced by the file path;
//! without a placeholder the path is appended as the last argument.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

use super::{non_blank, TextExtractor};

/// Argument placeholder replaced by the input path
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Run a program to completion and return its stdout
///
/// The child is killed if the future is dropped, so an enclosing timeout
/// does not leave it running.
pub(super) async fn run_program(program: &str, args: &[String]) -> Result<String> {
    debug!(program, ?args, "Running extractor");
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Arguments for one run, with the input path filled in
    pub fn args_for(&self, path: &Path) -> Vec<String> {
        let input = path.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(INPUT_PLACEHOLDER, &input))
            .collect();
        if !self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            args.push(input);
        }
        args
    }
}

#[async_trait]
impl TextExtractor for CommandBackend {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let stdout = run_program(&self.program, &self.args_for(path)).await?;
        non_blank(stdout, path)
    }

    async fn health_check(&self) -> bool {
        Command::new(&self.program)
            .arg("--help")
            .kill_on_drop(true)
            .output()
            .await
            .is_ok()
    }

    fn name(&self) -> &str {
        &self.program
    }
}
