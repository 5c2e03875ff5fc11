//! Batch grading orchestrator.
//!
//! Grades many answer sheets against one key with bounded parallelism.
//! Sheets share nothing but the read-only key, so each runs independently;
//! a sheet whose text cannot be extracted is recorded as a failure and the
//! rest of the batch carries on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::model::AnswerKey;
use crate::normalize::normalize;
use crate::report::{AnswerKeySummary, BatchReport, SheetFailure, SheetReport};
use crate::results::round2;
use crate::scoring::{grade, ScoringConfig};
use crate::segment::{into_answers, segment};
use crate::traits::{ExtractedText, TextExtractor};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum sheets graded concurrently.
    pub parallelism: usize,
    /// Scoring knobs.
    pub scoring: ScoringConfig,
    /// Raw text shorter than this (trimmed) triggers a warning.
    pub min_text_chars: usize,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            scoring: ScoringConfig::default(),
            min_text_chars: 10,
        }
    }
}

/// One sheet to grade.
#[derive(Debug, Clone)]
pub struct SheetSpec {
    /// Student name recorded with the result.
    pub student: String,
    /// Path to the scanned image or text file.
    pub path: PathBuf,
}

impl SheetSpec {
    /// A sheet named after its file stem.
    pub fn from_path(path: PathBuf) -> Self {
        let student = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string());
        Self { student, path }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_sheet_start(&self, student: &str);
    fn on_sheet_complete(&self, report: &SheetReport);
    fn on_sheet_error(&self, student: &str, error: &str);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_sheet_start(&self, _: &str) {}
    fn on_sheet_complete(&self, _: &SheetReport) {}
    fn on_sheet_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The grading engine.
pub struct GradingEngine {
    extractor: Arc<dyn TextExtractor>,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(extractor: Arc<dyn TextExtractor>, config: GradingEngineConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &GradingEngineConfig {
        &self.config
    }

    /// Grade already-extracted text: normalize, segment, score.
    pub fn grade_text(&self, sheet: &SheetSpec, extracted: ExtractedText, key: &AnswerKey) -> SheetReport {
        let mut warnings = Vec::new();

        if extracted.text.trim().len() < self.config.min_text_chars {
            warnings.push(format!(
                "very little text extracted ({} chars); check scan quality or OCR setup",
                extracted.text.trim().len()
            ));
        }

        let cleaned = normalize(&extracted.text);
        let segments = segment(&cleaned);
        if segments.is_empty() {
            warnings.push("no answers detected on the sheet".to_string());
        }

        let answers = into_answers(&segments);
        let missing: Vec<String> = key
            .ids()
            .filter(|id| !answers.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            warnings.push(format!("questions in key but not on sheet: {}", missing.join(", ")));
        }

        let grade = grade(&answers, key, &self.config.scoring);
        if !grade.unkeyed_answers.is_empty() {
            let extra: Vec<String> = grade.unkeyed_answers.iter().map(|id| id.to_string()).collect();
            warnings.push(format!("questions on sheet but not in key: {}", extra.join(", ")));
        }

        for w in &warnings {
            tracing::warn!("{}: {w}", sheet.student);
        }
        tracing::info!(
            "graded {}: {}/{}",
            sheet.student,
            grade.total_score,
            grade.max_score
        );

        SheetReport {
            student: sheet.student.clone(),
            source: sheet.path.clone(),
            extractor: extracted.extractor,
            extracted_chars: extracted.text.len(),
            segments,
            grade,
            warnings,
        }
    }

    /// Extract and grade a single sheet.
    pub async fn grade_sheet(&self, sheet: &SheetSpec, key: &AnswerKey) -> Result<SheetReport> {
        let extracted = self.extractor.extract(&sheet.path).await?;
        tracing::debug!(
            "{} extracted {} chars from {} in {}ms",
            extracted.extractor,
            extracted.text.len(),
            sheet.path.display(),
            extracted.duration_ms
        );
        Ok(self.grade_text(sheet, extracted, key))
    }

    /// Grade a batch of sheets against one key.
    pub async fn run(
        &self,
        sheets: &[SheetSpec],
        key: &AnswerKey,
        key_name: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        anyhow::ensure!(self.config.parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let semaphore = Semaphore::new(self.config.parallelism);

        let mut futures: FuturesUnordered<_> = sheets
            .iter()
            .map(|sheet| {
                let semaphore = &semaphore;
                async move {
                    let result = async {
                        let _permit = semaphore
                            .acquire()
                            .await
                            .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                        progress.on_sheet_start(&sheet.student);
                        self.grade_sheet(sheet, key).await
                    }
                    .await;
                    (sheet, result)
                }
            })
            .collect();

        let total = futures.len();
        let mut graded = Vec::new();
        let mut failures = Vec::new();

        while let Some((sheet, result)) = futures.next().await {
            match result {
                Ok(report) => {
                    progress.on_sheet_complete(&report);
                    graded.push(report);
                }
                Err(e) => {
                    tracing::error!("grading failed for {}: {e:#}", sheet.student);
                    progress.on_sheet_error(&sheet.student, &format!("{e:#}"));
                    failures.push(SheetFailure {
                        student: sheet.student.clone(),
                        source: sheet.path.clone(),
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, graded.len(), failures.len(), elapsed);

        graded.sort_by(|a, b| a.student.cmp(&b.student));
        failures.sort_by(|a, b| a.student.cmp(&b.student));

        Ok(BatchReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            answer_key: AnswerKeySummary {
                name: key_name.to_string(),
                question_count: key.len(),
                total_marks: round2(key.total_marks()),
            },
            sheets: graded,
            failures,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
