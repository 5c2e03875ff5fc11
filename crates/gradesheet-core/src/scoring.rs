//! Answer scoring.
//!
//! Objective questions are scored by trimmed, case-insensitive equality.
//! Subjective questions are scored by the share of expected-answer keywords
//! that appear in the student's answer.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, KeyEntry, QuestionType, StudentAnswers};
use crate::results::{round2, GradeSheet, ScoreResult, Verdict};

static KEYWORD_DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;:.()!?\-]+").expect("valid delimiter pattern"));

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "in", "on", "at", "to", "of",
];

/// Shortest keyword length kept.
const MIN_KEYWORD_LEN: usize = 3;
/// A subjective answer with no keywords to match needs more than this many
/// characters to earn credit.
const MIN_UNKEYWORDED_LEN: usize = 5;
/// At most this many expected keywords are listed in feedback.
const MAX_LISTED_KEYWORDS: usize = 5;

/// How a keyword must appear in the student's answer to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    /// Anywhere, including inside a longer word ("learn" in "learning").
    #[default]
    Substring,
    /// Only as a whole token.
    WholeWord,
}

/// Scoring knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub keyword_match: KeywordMatch,
    /// Share of marks at or above which a partial answer is "Good".
    #[serde(default = "default_good_ratio")]
    pub good_ratio: f64,
}

// Below the 70% rule on purpose: a subjective answer matching 2 of 3
// keywords (66.7%) must read as "Good". Set `good_ratio = 0.7` for the
// strict rule.
fn default_good_ratio() -> f64 {
    0.65
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keyword_match: KeywordMatch::default(),
            good_ratio: default_good_ratio(),
        }
    }
}

/// Derive the keyword list from an expected answer.
///
/// Splits on whitespace and punctuation, drops short tokens and stop words,
/// and de-duplicates case-insensitively keeping the first spelling.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    KEYWORD_DELIMITERS
        .split(text)
        .map(str::trim)
        .filter(|t| t.len() >= MIN_KEYWORD_LEN)
        .filter(|t| !STOP_WORDS.contains(&t.to_ascii_lowercase().as_str()))
        .filter(|t| seen.insert(t.to_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

fn keyword_present(keyword: &str, answer_lower: &str, mode: KeywordMatch) -> bool {
    let keyword = keyword.to_ascii_lowercase();
    match mode {
        KeywordMatch::Substring => answer_lower.contains(&keyword),
        KeywordMatch::WholeWord => KEYWORD_DELIMITERS
            .split(answer_lower)
            .any(|token| token == keyword),
    }
}

/// Score an objective answer.
pub fn score_objective(student_answer: &str, entry: &KeyEntry) -> ScoreResult {
    let student = student_answer.trim();
    let expected = entry.expected_answer.trim();

    let (score, verdict, remark) = if student.is_empty() {
        (0.0, Verdict::NoAnswer, "No answer provided".to_string())
    } else if student.to_lowercase() == expected.to_lowercase() {
        (entry.marks, Verdict::Correct, "Correct".to_string())
    } else {
        (
            0.0,
            Verdict::Incorrect,
            format!("Incorrect (Expected: {})", entry.expected_answer),
        )
    };

    ScoreResult {
        student_answer: student_answer.to_string(),
        score,
        marks: entry.marks,
        remark,
        correct_answer: entry.expected_answer.clone(),
        question_type: QuestionType::Objective,
        verdict,
        matched_keywords: Vec::new(),
    }
}

/// Score a subjective answer by keyword overlap.
pub fn score_subjective(student_answer: &str, entry: &KeyEntry, config: &ScoringConfig) -> ScoreResult {
    let marks = entry.marks;
    let result = |score: f64, verdict: Verdict, remark: String, matched: Vec<String>| ScoreResult {
        student_answer: student_answer.to_string(),
        score,
        marks,
        remark,
        correct_answer: entry.expected_answer.clone(),
        question_type: QuestionType::Subjective,
        verdict,
        matched_keywords: matched,
    };

    let student = student_answer.trim();
    if student.is_empty() {
        return result(0.0, Verdict::NoAnswer, "No answer provided".into(), vec![]);
    }

    let keywords = extract_keywords(&entry.expected_answer);
    if keywords.is_empty() {
        return if student.len() > MIN_UNKEYWORDED_LEN {
            result(
                marks,
                Verdict::Unkeyworded,
                "Answer provided (no keywords to match)".into(),
                vec![],
            )
        } else {
            result(0.0, Verdict::Unkeyworded, "No answer or keywords".into(), vec![])
        };
    }

    let answer_lower = student.to_lowercase();
    let matched: Vec<String> = keywords
        .iter()
        .filter(|kw| keyword_present(kw, &answer_lower, config.keyword_match))
        .cloned()
        .collect();

    let total = keywords.len();
    let hits = matched.len();
    let score = round2(marks * hits as f64 / total as f64).min(marks).max(0.0);

    let (verdict, remark) = if hits == total {
        (Verdict::Excellent, "Excellent - All keywords present".to_string())
    } else if score >= marks * config.good_ratio {
        (Verdict::Good, format!("Good - Matched {hits}/{total} keywords"))
    } else if score > 0.0 {
        (Verdict::Partial, format!("Partial - Matched {hits}/{total} keywords"))
    } else {
        let listed: Vec<&str> = keywords
            .iter()
            .take(MAX_LISTED_KEYWORDS)
            .map(String::as_str)
            .collect();
        (
            Verdict::Insufficient,
            format!("Insufficient - Expected keywords: {}", listed.join(", ")),
        )
    };

    result(score, verdict, remark, matched)
}

/// Score one answer against its key entry.
pub fn score_answer(student_answer: &str, entry: &KeyEntry, config: &ScoringConfig) -> ScoreResult {
    match entry.question_type {
        QuestionType::Objective => score_objective(student_answer, entry),
        QuestionType::Subjective => score_subjective(student_answer, entry, config),
    }
}

/// Score every question in the key.
///
/// Unanswered key questions score 0 with a "No answer provided" remark.
/// Answers whose id is not in the key are listed in `unkeyed_answers`.
pub fn grade(answers: &StudentAnswers, key: &AnswerKey, config: &ScoringConfig) -> GradeSheet {
    tracing::debug!(
        "grading {} key questions against {} answers",
        key.len(),
        answers.len()
    );

    let results: std::collections::BTreeMap<_, _> = key
        .iter()
        .map(|(id, entry)| {
            let student_answer = answers.get(id).unwrap_or_default();
            let result = score_answer(student_answer, entry, config);
            tracing::debug!(
                question = %id,
                kind = %entry.question_type,
                score = result.score,
                marks = result.marks,
                "{}",
                result.remark
            );
            (id.clone(), result)
        })
        .collect();

    let total_score = round2(results.values().map(|r| r.score).sum());
    let unkeyed_answers = answers.ids().filter(|id| !key.contains(id)).cloned().collect();

    GradeSheet {
        results,
        total_score,
        max_score: round2(key.total_marks()),
        unkeyed_answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn qid(s: &str) -> QuestionId {
        QuestionId::parse(s).unwrap()
    }

    fn entry(answer: &str, marks: f64, question_type: QuestionType) -> KeyEntry {
        KeyEntry {
            expected_answer: answer.into(),
            marks,
            question_type,
        }
    }

    #[test]
    fn objective_exact_match_case_insensitive() {
        let r = score_objective("  paris ", &entry("Paris", 2.0, QuestionType::Objective));
        assert_eq!(r.score, 2.0);
        assert_eq!(r.remark, "Correct");
        assert_eq!(r.verdict, Verdict::Correct);
    }

    #[test]
    fn objective_full_marks_for_any_positive_marks() {
        for marks in [0.5, 1.0, 2.25, 10.0, 99.99] {
            let r = score_objective("B", &entry("b", marks, QuestionType::Objective));
            assert_eq!(r.score, marks);
        }
    }

    #[test]
    fn objective_mismatch_names_expected() {
        let r = score_objective("London", &entry("Paris", 2.0, QuestionType::Objective));
        assert_eq!(r.score, 0.0);
        assert!(r.remark.contains("Paris"));
        assert_eq!(r.verdict, Verdict::Incorrect);
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        assert_eq!(
            extract_keywords("Machine Learning is a subset of AI"),
            vec!["Machine", "Learning", "subset"]
        );
        assert_eq!(
            extract_keywords("The cell-wall (of plants); the CELL!"),
            vec!["cell", "wall", "plants"]
        );
        assert!(extract_keywords("a an to of").is_empty());
    }

    #[test]
    fn subjective_partial_good() {
        let e = entry("Machine Learning is a subset of AI", 5.0, QuestionType::Subjective);
        let r = score_subjective(
            "AI includes Machine Learning and Deep Learning",
            &e,
            &ScoringConfig::default(),
        );
        assert_eq!(r.score, 3.33);
        assert!(r.remark.starts_with("Good"));
        assert_eq!(r.verdict, Verdict::Good);
        assert_eq!(r.matched_keywords, vec!["Machine", "Learning"]);
    }

    #[test]
    fn good_threshold_is_configurable() {
        let e = entry("Machine Learning is a subset of AI", 5.0, QuestionType::Subjective);
        let strict = ScoringConfig {
            good_ratio: 0.7,
            ..Default::default()
        };
        let r = score_subjective("AI includes Machine Learning and Deep Learning", &e, &strict);
        assert_eq!(r.score, 3.33);
        assert_eq!(r.verdict, Verdict::Partial);
    }

    #[test]
    fn subjective_all_keywords() {
        let e = entry("Photosynthesis uses sunlight", 4.0, QuestionType::Subjective);
        let r = score_subjective(
            "Photosynthesis in plants uses sunlight",
            &e,
            &ScoringConfig::default(),
        );
        assert_eq!(r.score, 4.0);
        assert!(r.remark.starts_with("Excellent"));
    }

    #[test]
    fn subjective_partial_and_insufficient() {
        let e = entry("alpha beta gamma delta", 4.0, QuestionType::Subjective);
        let partial = score_subjective("only alpha here", &e, &ScoringConfig::default());
        assert_eq!(partial.score, 1.0);
        assert!(partial.remark.starts_with("Partial - Matched 1/4"));

        let none = score_subjective("nothing relevant", &e, &ScoringConfig::default());
        assert_eq!(none.score, 0.0);
        assert_eq!(none.verdict, Verdict::Insufficient);
        assert!(none.remark.contains("alpha, beta, gamma, delta"));
    }

    #[test]
    fn insufficient_lists_at_most_five_keywords() {
        let e = entry("one1 two2 three four five six seven", 1.0, QuestionType::Subjective);
        let r = score_subjective("zzz", &e, &ScoringConfig::default());
        assert_eq!(
            r.remark,
            "Insufficient - Expected keywords: one1, two2, three, four, five"
        );
    }

    #[test]
    fn subjective_empty_answer_short_circuits() {
        let e = entry("Machine Learning", 5.0, QuestionType::Subjective);
        for blank in ["", "   ", "\t"] {
            let r = score_subjective(blank, &e, &ScoringConfig::default());
            assert_eq!(r.score, 0.0);
            assert_eq!(r.remark, "No answer provided");
        }
    }

    #[test]
    fn subjective_without_keywords_uses_length() {
        let e = entry("It is so", 3.0, QuestionType::Subjective);
        let long = score_subjective("a real answer", &e, &ScoringConfig::default());
        assert_eq!(long.score, 3.0);
        let short = score_subjective("yes", &e, &ScoringConfig::default());
        assert_eq!(short.score, 0.0);
        let exactly_five = score_subjective("abcde", &e, &ScoringConfig::default());
        assert_eq!(exactly_five.score, 0.0);
    }

    #[test]
    fn whole_word_matching_rejects_substrings() {
        let e = entry("gain", 2.0, QuestionType::Subjective);
        let substring = score_subjective("regained ground", &e, &ScoringConfig::default());
        assert_eq!(substring.score, 2.0);

        let strict = ScoringConfig {
            keyword_match: KeywordMatch::WholeWord,
            ..Default::default()
        };
        let whole = score_subjective("regained ground", &e, &strict);
        assert_eq!(whole.score, 0.0);
        let hit = score_subjective("a net gain, overall", &e, &strict);
        assert_eq!(hit.score, 2.0);
    }

    #[test]
    fn subjective_score_bounded_and_stepped() {
        let e = entry("red orange yellow green blue indigo violet", 3.0, QuestionType::Subjective);
        let step = 3.0 / 7.0;
        let answers = [
            "",
            "red",
            "red orange",
            "red orange yellow green",
            "violet indigo blue green yellow orange red",
        ];
        for a in answers {
            let r = score_subjective(a, &e, &ScoringConfig::default());
            assert!(r.score >= 0.0 && r.score <= r.marks, "{a}: {}", r.score);
            let steps = (r.score / step).round();
            assert!((r.score - steps * step).abs() <= 0.005 + 1e-9, "{a}: {}", r.score);
        }
    }

    #[test]
    fn grade_covers_every_key_question() {
        let key: AnswerKey = [
            (qid("Q1"), entry("Paris", 2.0, QuestionType::Objective)),
            (
                qid("Q2"),
                entry("Machine Learning is a subset of AI", 5.0, QuestionType::Subjective),
            ),
            (qid("Q3"), entry("Jupiter", 1.0, QuestionType::Objective)),
        ]
        .into_iter()
        .collect();
        let answers: StudentAnswers = [
            (qid("Q1"), "paris"),
            (qid("Q2"), "AI includes Machine Learning and Deep Learning"),
            (qid("Q9"), "extra"),
        ]
        .into_iter()
        .collect();

        let sheet = grade(&answers, &key, &ScoringConfig::default());
        assert_eq!(sheet.results.len(), 3);
        assert_eq!(sheet.results[&qid("Q1")].score, 2.0);
        assert_eq!(sheet.results[&qid("Q2")].score, 3.33);
        assert_eq!(sheet.results[&qid("Q3")].score, 0.0);
        assert_eq!(sheet.results[&qid("Q3")].remark, "No answer provided");
        assert_eq!(sheet.total_score, 5.33);
        assert_eq!(sheet.max_score, 8.0);
        assert_eq!(sheet.unkeyed_answers, vec![qid("Q9")]);
        assert_eq!(sheet.unanswered(), 1);
    }

    #[test]
    fn grade_empty_key() {
        let sheet = grade(
            &StudentAnswers::new(),
            &AnswerKey::new(),
            &ScoringConfig::default(),
        );
        assert!(sheet.results.is_empty());
        assert_eq!(sheet.total_score, 0.0);
    }
}
