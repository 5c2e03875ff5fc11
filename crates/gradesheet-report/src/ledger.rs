//! Append-only results ledger.
//!
//! Every graded sheet adds one row to `results.csv` and writes its own
//! `<student>_<YYYYmmdd_HHMMSS>_details.csv` next to it.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gradesheet_core::results::GradeSheet;

/// File name of the summary ledger inside the data directory.
pub const RESULTS_FILE: &str = "results.csv";

/// One row of `results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(rename = "Student")]
    pub student: String,
    #[serde(rename = "EvaluatorUser")]
    pub evaluator: String,
    #[serde(rename = "AnswerKey")]
    pub answer_key: String,
    #[serde(rename = "Total Score")]
    pub total_score: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// One row of a per-student details file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    #[serde(rename = "QID")]
    pub qid: String,
    #[serde(rename = "StudentAnswer")]
    pub student_answer: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Marks")]
    pub marks: f64,
    #[serde(rename = "Remark")]
    pub remark: String,
    #[serde(rename = "CorrectAnswer")]
    pub correct_answer: String,
    #[serde(rename = "Type")]
    pub question_type: String,
}

/// Make a student name safe for a file name; other characters become `_`.
pub fn safe_name(student: &str) -> String {
    let cleaned: String = student
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "student".to_string()
    } else {
        cleaned
    }
}

/// Results ledger rooted at a data directory.
pub struct ResultsLedger {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ResultsLedger {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(RESULTS_FILE)
    }

    /// Record one graded sheet. Returns the path of the details file.
    pub fn record(
        &self,
        student: &str,
        evaluator: &str,
        answer_key: &str,
        sheet: &GradeSheet,
    ) -> Result<PathBuf> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("results ledger lock poisoned"))?;

        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        let now = chrono::Local::now();
        let stem = format!("{}_{}", safe_name(student), now.format("%Y%m%d_%H%M%S"));
        let (details_path, details_file) = create_details_file(&self.data_dir, &stem)?;
        write_details(&details_path, details_file, sheet)?;

        let results_path = self.results_path();
        let needs_header = std::fs::metadata(&results_path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&results_path)
            .with_context(|| format!("failed to open {}", results_path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(ResultSummary {
                student: student.to_string(),
                evaluator: evaluator.to_string(),
                answer_key: answer_key.to_string(),
                total_score: sheet.total_score,
                timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .context("failed to write results row")?;
        writer
            .flush()
            .with_context(|| format!("failed to write {}", results_path.display()))?;

        tracing::info!(
            "recorded {student}: {} (details in {})",
            sheet.total_score,
            details_path.display()
        );
        Ok(details_path)
    }

    /// Every summary row recorded so far, oldest first.
    pub fn summaries(&self) -> Result<Vec<ResultSummary>> {
        let path = self.results_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let mut rows = Vec::new();
        for (i, row) in reader.deserialize::<ResultSummary>().enumerate() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!("skipping results row {}: {e}", i + 2),
            }
        }
        Ok(rows)
    }
}

/// Create `<stem>_details.csv`, or `<stem>_2_details.csv` and so on when an
/// earlier record in the same second took the name.
fn create_details_file(dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    for attempt in 1u32.. {
        let name = if attempt == 1 {
            format!("{stem}_details.csv")
        } else {
            format!("{stem}_{attempt}_details.csv")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create {}", path.display()))
            }
        }
    }
    anyhow::bail!("no free details file name for {stem}")
}

fn write_details(path: &Path, file: File, sheet: &GradeSheet) -> Result<()> {
    let mut writer = csv::Writer::from_writer(file);
    for (id, result) in &sheet.results {
        writer.serialize(DetailRow {
            qid: id.to_string(),
            student_answer: result.student_answer.clone(),
            score: result.score,
            marks: result.marks,
            remark: result.remark.clone(),
            correct_answer: result.correct_answer.clone(),
            question_type: result.question_type.code().to_string(),
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Read a details file back.
pub fn read_details(path: &Path) -> Result<Vec<DetailRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<DetailRow>, _>>()
        .with_context(|| format!("failed to parse {}", path.display()))
}
