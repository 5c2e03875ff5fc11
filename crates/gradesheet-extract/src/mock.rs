//! Mock extractor for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use gradesheet_core::traits::{ExtractedText, TextExtractor};

use crate::error::ExtractError;

/// Returns canned text per sheet path without touching the filesystem.
pub struct MockExtractor {
    /// Map of path → text.
    texts: HashMap<PathBuf, String>,
    /// Fallback when no path matches; `None` means "not found".
    default_text: Option<String>,
    call_count: AtomicU32,
}

impl MockExtractor {
    pub fn new(texts: HashMap<PathBuf, String>) -> Self {
        Self {
            texts,
            default_text: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// A mock that returns the same text for every sheet.
    pub fn with_fixed_text(text: &str) -> Self {
        Self {
            texts: HashMap::new(),
            default_text: Some(text.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, path: &Path) -> anyhow::Result<ExtractedText> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let text = self
            .texts
            .get(path)
            .or(self.default_text.as_ref())
            .cloned()
            .ok_or_else(|| ExtractError::SourceNotFound(path.to_path_buf()))?;

        Ok(ExtractedText {
            text,
            extractor: "mock".into(),
            duration_ms: 0,
        })
    }
}
