//! Scanned sheets via the Tesseract command-line tool.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use gradesheet_core::traits::{ExtractedText, TextExtractor};

use crate::config::OcrConfig;
use crate::error::ExtractError;

/// Image extensions handed to the OCR tool.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Runs `<cmd> <image> stdout --psm <n> -l <lang>` and captures stdout.
pub struct TesseractExtractor {
    config: OcrConfig,
}

impl TesseractExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Whether this backend handles the given file.
    pub fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.tesseract_cmd);
        cmd.arg(path)
            .arg("stdout")
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .arg("-l")
            .arg(&self.config.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn extract(&self, path: &Path) -> anyhow::Result<ExtractedText> {
        if !path.exists() {
            return Err(ExtractError::SourceNotFound(path.to_path_buf()).into());
        }
        if !Self::supports(path) {
            return Err(ExtractError::UnsupportedFormat(path.to_path_buf()).into());
        }

        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, self.command(path).output())
            .await
            .map_err(|_| ExtractError::Timeout(self.config.timeout_secs))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::OcrUnavailable {
                        cmd: self.config.tesseract_cmd.clone(),
                    }
                } else {
                    ExtractError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            return Err(ExtractError::OcrFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("OCR of {} took {duration_ms}ms", path.display());

        Ok(ExtractedText {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            extractor: self.name().to_string(),
            duration_ms,
        })
    }
}
