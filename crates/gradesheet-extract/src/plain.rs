//! Plain-text sheets, read as-is.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;

use gradesheet_core::traits::{ExtractedText, TextExtractor};

use crate::error::ExtractError;

/// Reads `.txt` answer sheets. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether this backend handles the given file.
    pub fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain"
    }

    async fn extract(&self, path: &Path) -> anyhow::Result<ExtractedText> {
        let start = Instant::now();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::SourceNotFound(path.to_path_buf())
            } else {
                ExtractError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(ExtractedText {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            extractor: self.name().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
