//! Configuration structures for the voucher pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the pettycash pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PettyCashConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field and table extraction configuration.
    pub extraction: ExtractionConfig,

    /// Voucher database configuration.
    pub storage: StorageConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// External recognizer command. The image path is appended as the last
    /// argument and the command must print `{"text": ...}` or `{"error": ...}`.
    /// Written as `null` when unset so it can be set by key.
    pub command: Option<Vec<String>>,

    /// Seconds to wait for recognition before giving up.
    pub timeout_secs: u64,

    /// Keep `[UNK]` glyph markers in recognized text.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "en_rec.onnx".to_string(),
            dictionary: "en_dict.txt".to_string(),
            command: None,
            timeout_secs: 120,
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Recognition timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Voucher extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Try to correct common OCR errors in numbers (`O` for `0`, `l` for `1`).
    pub auto_correct: bool,

    /// Label that opens the accounting allocation box. Matched
    /// case-insensitively.
    pub allocation_marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            auto_correct: true,
            allocation_marker: "Accounting Allocation".to_string(),
        }
    }
}

/// Voucher database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("vouchers.db"),
        }
    }
}

impl PettyCashConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
