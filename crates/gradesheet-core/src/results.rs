//! Grading result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{QuestionId, QuestionType};

/// The outcome class of a single scored question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Objective answer matched.
    Correct,
    /// Objective answer did not match.
    Incorrect,
    /// Every keyword present.
    Excellent,
    /// At or above the "good" share of marks.
    Good,
    /// Some credit.
    Partial,
    /// No keyword matched.
    Insufficient,
    /// Expected answer has no keywords; graded on answer length alone.
    Unkeyworded,
    /// Blank or missing answer.
    NoAnswer,
}

impl Verdict {
    /// Whether the question earned full marks.
    pub fn is_full_credit(&self) -> bool {
        matches!(self, Verdict::Correct | Verdict::Excellent)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Excellent => "excellent",
            Verdict::Good => "good",
            Verdict::Partial => "partial",
            Verdict::Insufficient => "insufficient",
            Verdict::Unkeyworded => "unkeyworded",
            Verdict::NoAnswer => "no answer",
        };
        f.write_str(s)
    }
}

/// The score for one answer-key question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// What the student wrote (empty when unanswered).
    pub student_answer: String,
    /// Awarded score, in `[0, marks]`.
    pub score: f64,
    /// Marks available.
    pub marks: f64,
    /// Human-readable feedback.
    pub remark: String,
    /// The expected answer from the key.
    pub correct_answer: String,
    pub question_type: QuestionType,
    pub verdict: Verdict,
    /// Keywords found in a subjective answer.
    #[serde(default)]
    pub matched_keywords: Vec<String>,
}

/// Scores for every question in the key plus the total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeSheet {
    /// One result per answer-key question, in exam order.
    pub results: BTreeMap<QuestionId, ScoreResult>,
    /// Sum of scores, rounded to 2 decimal places.
    pub total_score: f64,
    /// Sum of marks available.
    pub max_score: f64,
    /// Student ids that have no answer-key entry (reported, not scored).
    #[serde(default)]
    pub unkeyed_answers: Vec<QuestionId>,
}

impl GradeSheet {
    /// Total as a percentage of the maximum, 0 when the key is empty.
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0.0 {
            self.total_score / self.max_score * 100.0
        } else {
            0.0
        }
    }

    /// Number of key questions the student left blank.
    pub fn unanswered(&self) -> usize {
        self.results
            .values()
            .filter(|r| r.verdict == Verdict::NoAnswer)
            .count()
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
