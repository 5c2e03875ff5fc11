//! Grading report types with JSON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::QuestionId;
use crate::results::GradeSheet;
use crate::segment::Segment;
use crate::statistics::{class_analysis, question_stats, ClassAnalysis, QuestionStats};

/// The graded outcome for one student's sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetReport {
    /// Student name (file stem in batch mode).
    pub student: String,
    /// Where the sheet came from.
    pub source: PathBuf,
    /// Which extractor produced the text.
    #[serde(default)]
    pub extractor: String,
    /// Characters of raw text extracted.
    pub extracted_chars: usize,
    /// Answers as segmented from the sheet.
    pub segments: Vec<Segment>,
    /// Per-question scores and total.
    pub grade: GradeSheet,
    /// Non-fatal issues noticed while grading.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// A sheet that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetFailure {
    pub student: String,
    pub source: PathBuf,
    pub error: String,
}

/// Summary of the answer key used (without the full entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerKeySummary {
    pub name: String,
    pub question_count: usize,
    pub total_marks: f64,
}

/// A complete batch grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub answer_key: AnswerKeySummary,
    /// Graded sheets, sorted by student name.
    pub sheets: Vec<SheetReport>,
    #[serde(default)]
    pub failures: Vec<SheetFailure>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BatchReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Class summary over the graded sheets.
    pub fn class_analysis(&self, pass_ratio: f64) -> Option<ClassAnalysis> {
        let totals: Vec<f64> = self.sheets.iter().map(|s| s.grade.total_score).collect();
        class_analysis(&totals, pass_ratio)
    }

    /// Per-question statistics over the graded sheets.
    pub fn question_stats(&self) -> BTreeMap<QuestionId, QuestionStats> {
        question_stats(self.sheets.iter().map(|s| &s.grade))
    }
}
