//! Core trait definitions for text extraction backends.
//!
//! Implemented by the `gradesheet-extract` crate (plain text, Tesseract OCR,
//! mock). The core only ever sees the extracted string.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for backends that turn an answer-sheet file into raw text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Human-readable backend name (e.g. "tesseract").
    fn name(&self) -> &str;

    /// Extract raw text from the sheet at `path`.
    async fn extract(&self, path: &Path) -> anyhow::Result<ExtractedText>;
}

/// Raw text pulled from one answer sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// The unprocessed text.
    pub text: String,
    /// Backend that produced it.
    pub extractor: String,
    /// Extraction time in milliseconds.
    pub duration_ms: u64,
}
