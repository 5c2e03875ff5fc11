//! Core data model types for gradesheet.
//!
//! These are the fundamental types shared by the segmenter, the answer-key
//! loader and the scoring engine: canonical question ids, answer-key entries
//! and the student's answers as discovered on the sheet.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A canonical question identifier such as `Q1` or `Q3B`.
///
/// Always uppercase, always `Q`-prefixed, never empty after the prefix.
/// Ordered by numeric part first so maps iterate in exam order
/// (`Q2` before `Q10`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Canonicalize a raw identifier.
    ///
    /// `"1"`, `"q1"`, `"Q.1"` and `" Q 1 "` all become `Q1`. Returns `None`
    /// when nothing identifying is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Some(Self::from_digits(trimmed));
        }

        let mut compact: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        if compact.is_empty() {
            return None;
        }
        if !compact.starts_with('Q') {
            compact.insert(0, 'Q');
        }
        if compact.len() == 1 {
            return None;
        }
        Some(Self(compact))
    }

    /// Build the id for question number `n`.
    pub fn from_number(n: u64) -> Self {
        Self(format!("Q{n}"))
    }

    fn from_digits(digits: &str) -> Self {
        Self(format!("Q{digits}"))
    }

    /// The canonical text, e.g. `"Q3B"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first run of digits in the id (`Q3B` -> 3), if any.
    pub fn number(&self) -> Option<u64> {
        let digits: String = self
            .0
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuestionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a question id: {s:?}"))
    }
}

impl Ord for QuestionId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ids without digits sort after numbered ones.
        let key = |id: &Self| id.number().unwrap_or(u64::MAX);
        key(self)
            .cmp(&key(other))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for QuestionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How a question is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Exact (case-insensitive) match against one expected answer.
    Objective,
    /// Proportional keyword overlap.
    Subjective,
}

impl QuestionType {
    /// Classify a type code by its first letter: anything starting with `O`
    /// is objective, everything else (including empty) is subjective.
    pub fn from_code(code: &str) -> Self {
        match code.trim().chars().next() {
            Some(c) if c.eq_ignore_ascii_case(&'o') => QuestionType::Objective,
            _ => QuestionType::Subjective,
        }
    }

    /// Single-letter code used in tabular output.
    pub fn code(&self) -> &'static str {
        match self {
            QuestionType::Objective => "O",
            QuestionType::Subjective => "S",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEntry {
    /// The expected answer text (trimmed).
    pub expected_answer: String,
    /// Marks available for this question, always positive.
    pub marks: f64,
    /// How the question is scored.
    pub question_type: QuestionType,
}

/// Anomalies absorbed while loading an answer key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadDiagnostics {
    /// Ids that appeared more than once; the last row won.
    pub duplicate_ids: Vec<QuestionId>,
    /// Rows skipped because the id was empty or the row was unreadable.
    pub skipped_rows: usize,
    /// Ids whose marks cell was missing or unparsable and defaulted to 1.0.
    pub defaulted_marks: Vec<QuestionId>,
}

/// The full answer key: one entry per canonical question id.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    entries: BTreeMap<QuestionId, KeyEntry>,
    diagnostics: LoadDiagnostics,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the entry it replaced (if any).
    pub fn insert(&mut self, id: QuestionId, entry: KeyEntry) -> Option<KeyEntry> {
        self.entries.insert(id, entry)
    }

    pub fn get(&self, id: &QuestionId) -> Option<&KeyEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in exam order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &KeyEntry)> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.entries.keys()
    }

    /// The maximum attainable score.
    pub fn total_marks(&self) -> f64 {
        self.entries.values().map(|e| e.marks).sum()
    }

    pub fn diagnostics(&self) -> &LoadDiagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut LoadDiagnostics {
        &mut self.diagnostics
    }
}

impl FromIterator<(QuestionId, KeyEntry)> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = (QuestionId, KeyEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            diagnostics: LoadDiagnostics::default(),
        }
    }
}

/// A student's answers keyed by question id, in order of discovery.
///
/// Inserting an id that is already present replaces its answer but keeps the
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentAnswers {
    order: Vec<QuestionId>,
    answers: HashMap<QuestionId, String>,
}

impl StudentAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, returning the previous answer for the same id.
    pub fn insert(&mut self, id: QuestionId, answer: impl Into<String>) -> Option<String> {
        let previous = self.answers.insert(id.clone(), answer.into());
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn get(&self, id: &QuestionId) -> Option<&str> {
        self.answers.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.answers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Answers in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &str)> {
        self.order
            .iter()
            .filter_map(|id| self.answers.get(id).map(|a| (id, a.as_str())))
    }

    pub fn ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.order.iter()
    }
}

impl<S: Into<String>> FromIterator<(QuestionId, S)> for StudentAnswers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, S)>>(iter: T) -> Self {
        let mut answers = Self::new();
        for (id, answer) in iter {
            answers.insert(id, answer);
        }
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(s: &str) -> QuestionId {
        QuestionId::parse(s).unwrap()
    }

    #[test]
    fn canonical_forms_agree() {
        for raw in ["1", "q1", "Q.1", " Q 1 ", "Q1"] {
            assert_eq!(qid(raw).as_str(), "Q1", "raw id {raw:?}");
        }
        assert_eq!(qid("3b").as_str(), "Q3B");
        assert_eq!(qid("q 3 b").as_str(), "Q3B");
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert!(QuestionId::parse("").is_none());
        assert!(QuestionId::parse("   ").is_none());
        assert!(QuestionId::parse("q").is_none());
        assert!(QuestionId::parse(".-").is_none());
    }

    #[test]
    fn number_is_first_digit_run() {
        assert_eq!(qid("Q12").number(), Some(12));
        assert_eq!(qid("Q3B").number(), Some(3));
        assert_eq!(qid("QX").number(), None);
    }

    #[test]
    fn ordering_is_numeric() {
        let mut ids = vec![qid("Q10"), qid("Q2"), qid("QX"), qid("Q2B"), qid("Q1")];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["Q1", "Q2", "Q2B", "Q10", "QX"]);
    }

    #[test]
    fn question_type_from_code() {
        assert_eq!(QuestionType::from_code("O"), QuestionType::Objective);
        assert_eq!(QuestionType::from_code("objective"), QuestionType::Objective);
        assert_eq!(QuestionType::from_code(" o "), QuestionType::Objective);
        assert_eq!(QuestionType::from_code("S"), QuestionType::Subjective);
        assert_eq!(QuestionType::from_code("mcq"), QuestionType::Subjective);
        assert_eq!(QuestionType::from_code(""), QuestionType::Subjective);
    }

    #[test]
    fn student_answers_last_wins_keeps_position() {
        let mut answers = StudentAnswers::new();
        answers.insert(qid("Q2"), "first");
        answers.insert(qid("Q1"), "one");
        let previous = answers.insert(qid("Q2"), "second");

        assert_eq!(previous.as_deref(), Some("first"));
        assert_eq!(answers.len(), 2);
        let collected: Vec<(&str, &str)> =
            answers.iter().map(|(id, a)| (id.as_str(), a)).collect();
        assert_eq!(collected, vec![("Q2", "second"), ("Q1", "one")]);
    }

    #[test]
    fn answer_key_total_marks() {
        let key: AnswerKey = [
            (
                qid("Q1"),
                KeyEntry {
                    expected_answer: "Paris".into(),
                    marks: 2.0,
                    question_type: QuestionType::Objective,
                },
            ),
            (
                qid("Q2"),
                KeyEntry {
                    expected_answer: "Photosynthesis converts light".into(),
                    marks: 3.5,
                    question_type: QuestionType::Subjective,
                },
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(key.len(), 2);
        assert!((key.total_marks() - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn question_id_serde_is_plain_string() {
        let json = serde_json::to_string(&qid("q4")).unwrap();
        assert_eq!(json, "\"Q4\"");
        let back: QuestionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, qid("Q4"));
    }
}
