//! Answer-key loading errors.
//!
//! Only structural failures of the key source surface as errors. Bad rows,
//! unparsable marks and unknown type codes are absorbed by the loader and
//! show up in [`LoadDiagnostics`](crate::model::LoadDiagnostics) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort loading an answer key.
#[derive(Debug, Error)]
pub enum AnswerKeyError {
    /// The key file does not exist.
    #[error("answer key not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The tabular structure could not be parsed at all.
    #[error("malformed answer key {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// The key exists but could not be read.
    #[error("failed to read answer key {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnswerKeyError {
    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        AnswerKeyError::MalformedSource {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the key source is missing rather than broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnswerKeyError::SourceNotFound { .. })
    }
}
