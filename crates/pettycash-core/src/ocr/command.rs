//! Recognition through an external OCR program.
//!
//! The program receives the image path as its last argument and prints a
//! single JSON object on stdout: `{"text": "..."}` on success or
//! `{"error": "..."}` on failure.

use std::io::Write;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::OcrError;

use super::TextRecognizer;

#[derive(Debug, Deserialize)]
struct RunnerOutput {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Runs a configured command per image.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// `command` is the program followed by its fixed arguments.
    pub fn new(command: &[String]) -> Result<Self, OcrError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| OcrError::ModelLoad("empty OCR command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TextRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let format = image::guess_format(image)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        let suffix = format
            .extensions_str()
            .first()
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("voucher-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| OcrError::Recognition(format!("failed to stage image: {}", e)))?;
        file.write_all(image)
            .and_then(|_| file.flush())
            .map_err(|e| OcrError::Recognition(format!("failed to stage image: {}", e)))?;

        debug!("Running {} {:?} on {}", self.program, self.args, file.path().display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .output()
            .map_err(|e| OcrError::Recognition(format!("failed to run {}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match serde_json::from_str::<RunnerOutput>(stdout.trim()) {
            Ok(RunnerOutput {
                error: Some(error), ..
            }) => Err(OcrError::Recognition(error)),
            Ok(RunnerOutput {
                text: Some(text), ..
            }) if output.status.success() => Ok(text),
            _ if !output.status.success() => Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Ok(_) => Err(OcrError::Recognition(format!(
                "{} printed neither text nor error",
                self.program
            ))),
            Err(e) => Err(OcrError::Recognition(format!(
                "unreadable output from {}: {}",
                self.program, e
            ))),
        }
    }
}
