//! Routes each sheet to the backend that can read it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use gradesheet_core::traits::{ExtractedText, TextExtractor};

use crate::config::GradesheetConfig;
use crate::error::ExtractError;
use crate::plain::PlainTextExtractor;
use crate::tesseract::TesseractExtractor;

/// Plain text for `.txt`, OCR for images.
pub struct AutoExtractor {
    plain: PlainTextExtractor,
    ocr: TesseractExtractor,
}

impl AutoExtractor {
    pub fn new(plain: PlainTextExtractor, ocr: TesseractExtractor) -> Self {
        Self { plain, ocr }
    }

    /// Whether any backend handles the given file.
    pub fn supports(path: &Path) -> bool {
        PlainTextExtractor::supports(path) || TesseractExtractor::supports(path)
    }
}

#[async_trait]
impl TextExtractor for AutoExtractor {
    fn name(&self) -> &str {
        "auto"
    }

    async fn extract(&self, path: &Path) -> anyhow::Result<ExtractedText> {
        if PlainTextExtractor::supports(path) {
            self.plain.extract(path).await
        } else if TesseractExtractor::supports(path) {
            self.ocr.extract(path).await
        } else {
            Err(ExtractError::UnsupportedFormat(path.to_path_buf()).into())
        }
    }
}

/// Build the extractor described by the configuration.
pub fn create_extractor(config: &GradesheetConfig) -> Arc<dyn TextExtractor> {
    Arc::new(AutoExtractor::new(
        PlainTextExtractor::new(),
        TesseractExtractor::new(config.ocr.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn routes_text_to_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carol.txt");
        std::fs::write(&path, "Q1: Paris").unwrap();

        let extractor = create_extractor(&GradesheetConfig::default());
        let out = extractor.extract(&path).await.unwrap();
        assert_eq!(out.extractor, "plain");
        assert_eq!(out.text, "Q1: Paris");
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, "x").unwrap();

        let err = create_extractor(&GradesheetConfig::default())
            .extract(&path)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn supports_union() {
        assert!(AutoExtractor::supports(Path::new("a.txt")));
        assert!(AutoExtractor::supports(Path::new("a.jpeg")));
        assert!(!AutoExtractor::supports(Path::new("a.csv")));
    }
}
