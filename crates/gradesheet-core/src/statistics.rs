//! Class-level statistics over graded sheets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::QuestionId;
use crate::results::{round2, GradeSheet};

/// Default pass threshold as a share of the highest observed total.
pub const DEFAULT_PASS_RATIO: f64 = 0.33;

/// Summary of a class's total scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAnalysis {
    pub total_students: usize,
    /// Mean total, rounded to 2 decimal places.
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    /// `pass_ratio` times the highest observed total.
    pub pass_threshold: f64,
    pub passed: usize,
    pub failed: usize,
}

impl ClassAnalysis {
    /// Share of students who passed, as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.total_students == 0 {
            0.0
        } else {
            self.passed as f64 / self.total_students as f64 * 100.0
        }
    }
}

/// Analyze a set of total scores.
///
/// Returns `None` when there are no scores. The pass mark is relative to the
/// best score in the set, not to the key's maximum.
pub fn class_analysis(totals: &[f64], pass_ratio: f64) -> Option<ClassAnalysis> {
    if totals.is_empty() {
        return None;
    }

    let highest = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let average = totals.iter().sum::<f64>() / totals.len() as f64;
    let pass_threshold = if highest > 0.0 { highest * pass_ratio } else { 0.0 };
    let passed = totals.iter().filter(|&&t| t >= pass_threshold).count();

    Some(ClassAnalysis {
        total_students: totals.len(),
        average_score: round2(average),
        highest_score: highest,
        lowest_score: lowest,
        pass_threshold,
        passed,
        failed: totals.len() - passed,
    })
}

/// How one question fared across a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub marks: f64,
    /// Sheets that had a non-blank answer.
    pub attempts: usize,
    /// Mean score across all sheets, rounded to 2 decimal places.
    pub average_score: f64,
    pub full_marks: usize,
}

/// Per-question statistics across many graded sheets.
pub fn question_stats<'a>(
    sheets: impl IntoIterator<Item = &'a GradeSheet>,
) -> BTreeMap<QuestionId, QuestionStats> {
    let mut sums: BTreeMap<QuestionId, (QuestionStats, f64, usize)> = BTreeMap::new();

    for sheet in sheets {
        for (id, result) in &sheet.results {
            let (stats, total, count) = sums.entry(id.clone()).or_insert_with(|| {
                (
                    QuestionStats {
                        marks: result.marks,
                        attempts: 0,
                        average_score: 0.0,
                        full_marks: 0,
                    },
                    0.0,
                    0,
                )
            });
            if !result.student_answer.trim().is_empty() {
                stats.attempts += 1;
            }
            if result.verdict.is_full_credit() || (result.marks > 0.0 && result.score >= result.marks) {
                stats.full_marks += 1;
            }
            *total += result.score;
            *count += 1;
        }
    }

    sums.into_iter()
        .map(|(id, (mut stats, total, count))| {
            stats.average_score = round2(total / count as f64);
            (id, stats)
        })
        .collect()
}
