//! Extraction error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning a sheet into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The sheet file does not exist.
    #[error("sheet not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// No backend handles this kind of file.
    #[error("unsupported sheet format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The OCR binary could not be started.
    #[error("OCR tool '{cmd}' is not available (install Tesseract or set GRADESHEET_TESSERACT_CMD)")]
    OcrUnavailable { cmd: String },

    /// The OCR binary ran but exited with an error.
    #[error("OCR failed (exit code {}): {stderr}", .code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()))]
    OcrFailed { code: Option<i32>, stderr: String },

    /// The OCR binary did not finish in time.
    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    /// Reading the sheet failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
