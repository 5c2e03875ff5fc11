//! Answer-key loader.
//!
//! Reads a delimited table with a header row and maps its columns onto the
//! four logical fields (id, expected answer, marks, type) through alias
//! tables, so `QID,Question,Answer,Marks,Type` and `id;answer;score;kind`
//! both load. Bad rows degrade; only a missing or headerless source fails.

use std::path::Path;

use crate::error::AnswerKeyError;
use crate::model::{AnswerKey, KeyEntry, QuestionId, QuestionType};
use crate::scoring::extract_keywords;

const ID_ALIASES: &[&str] = &[
    "qid",
    "id",
    "questionid",
    "questionno",
    "questionnumber",
    "qno",
    "qnum",
    "number",
    "no",
];
const ANSWER_ALIASES: &[&str] = &[
    "answer",
    "expectedanswer",
    "correctanswer",
    "modelanswer",
    "solution",
    "key",
];
const MARKS_ALIASES: &[&str] = &["marks", "mark", "score", "points", "maxmarks", "weight"];
const TYPE_ALIASES: &[&str] = &["type", "qtype", "questiontype", "kind", "category"];

const DEFAULT_MARKS: f64 = 1.0;

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    id: usize,
    answer: Option<usize>,
    /// Marks columns in alias priority order; the first non-empty cell wins.
    marks: Vec<usize>,
    kind: Option<usize>,
}

fn header_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Option<Self> {
        let keys: Vec<String> = headers.iter().map(header_key).collect();
        let find_all = |aliases: &[&str]| -> Vec<usize> {
            aliases
                .iter()
                .filter_map(|alias| keys.iter().position(|k| k == alias))
                .collect()
        };

        Some(Self {
            id: find_all(ID_ALIASES).first().copied()?,
            answer: find_all(ANSWER_ALIASES).first().copied(),
            marks: find_all(MARKS_ALIASES),
            kind: find_all(TYPE_ALIASES).first().copied(),
        })
    }
}

/// Pick the delimiter that splits the header line into the most columns.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| header.bytes().filter(|b| b == d).count())
        .filter(|d| header.as_bytes().contains(d))
        .unwrap_or(b',')
}

fn parse_marks(cell: Option<&str>) -> Option<f64> {
    let marks: f64 = cell?.trim().parse().ok()?;
    (marks.is_finite() && marks > 0.0).then_some(marks)
}

/// Load an answer key from a delimited file.
pub fn load_answer_key(path: &Path) -> Result<AnswerKey, AnswerKeyError> {
    if !path.exists() {
        return Err(AnswerKeyError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| AnswerKeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);

    let key = parse_answer_key_str(&content, &path.display().to_string())?;
    tracing::info!("loaded {} questions from {}", key.len(), path.display());
    Ok(key)
}

/// Parse answer-key text (useful for testing).
pub fn parse_answer_key_str(content: &str, source_name: &str) -> Result<AnswerKey, AnswerKeyError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(AnswerKeyError::malformed(source_name, "no header row"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AnswerKeyError::malformed(source_name, format!("unreadable header: {e}")))?
        .clone();
    let columns = ColumnMap::resolve(&headers).ok_or_else(|| {
        AnswerKeyError::malformed(
            source_name,
            format!("no question id column in header: {}", headers.iter().collect::<Vec<_>>().join(", ")),
        )
    })?;

    let mut key = AnswerKey::new();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("{source_name}: skipping unreadable row {row}: {e}");
                key.diagnostics_mut().skipped_rows += 1;
                continue;
            }
        };

        let Some(id) = record.get(columns.id).and_then(QuestionId::parse) else {
            tracing::warn!("{source_name}: skipping row {row} with empty question id");
            key.diagnostics_mut().skipped_rows += 1;
            continue;
        };

        let expected_answer = columns
            .answer
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .trim()
            .to_string();

        let marks_cell = columns
            .marks
            .iter()
            .filter_map(|&i| record.get(i))
            .find(|cell| !cell.trim().is_empty());
        let parsed_marks = parse_marks(marks_cell);
        if parsed_marks.is_none() {
            tracing::debug!("{source_name}: row {row} ({id}) marks defaulted to {DEFAULT_MARKS}");
        }
        let marks = parsed_marks.unwrap_or(DEFAULT_MARKS);

        let question_type =
            QuestionType::from_code(columns.kind.and_then(|i| record.get(i)).unwrap_or_default());

        let entry = KeyEntry {
            expected_answer,
            marks,
            question_type,
        };
        let replaced = key.insert(id.clone(), entry).is_some();
        let diagnostics = key.diagnostics_mut();
        diagnostics.defaulted_marks.retain(|d| d != &id);
        if parsed_marks.is_none() {
            diagnostics.defaulted_marks.push(id.clone());
        }
        if replaced {
            tracing::warn!("{source_name}: duplicate question id {id} at row {row}, later row wins");
            diagnostics.duplicate_ids.push(id);
        }
    }

    Ok(key)
}

/// A warning from answer-key validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

/// Check a loaded key for issues that will make grading surprising.
pub fn validate_answer_key(key: &AnswerKey) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let diagnostics = key.diagnostics();

    if key.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "answer key has no questions".into(),
        });
    }

    if diagnostics.skipped_rows > 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!("{} row(s) skipped (empty id or unreadable)", diagnostics.skipped_rows),
        });
    }

    for id in &diagnostics.duplicate_ids {
        warnings.push(ValidationWarning {
            question_id: Some(id.clone()),
            message: format!("duplicate question id: {id} (last row wins)"),
        });
    }

    for id in &diagnostics.defaulted_marks {
        warnings.push(ValidationWarning {
            question_id: Some(id.clone()),
            message: format!("marks missing or invalid, defaulted to {DEFAULT_MARKS}"),
        });
    }

    for (id, entry) in key.iter() {
        match entry.question_type {
            QuestionType::Objective if entry.expected_answer.is_empty() => {
                warnings.push(ValidationWarning {
                    question_id: Some(id.clone()),
                    message: "objective question has an empty expected answer".into(),
                });
            }
            QuestionType::Subjective if extract_keywords(&entry.expected_answer).is_empty() => {
                warnings.push(ValidationWarning {
                    question_id: Some(id.clone()),
                    message: "subjective answer yields no keywords; any answer over 5 characters gets full marks"
                        .into(),
                });
            }
            _ => {}
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(s: &str) -> QuestionId {
        QuestionId::parse(s).unwrap()
    }

    const CLASSIC_KEY: &str = "\
QID,Question,Answer,Marks,Type
1,Capital of France?,Paris,2,O
Q2,Define ML,Machine Learning is a subset of AI,5,S
q.3,Largest planet,Jupiter,,objective
";

    #[test]
    fn parse_classic_key() {
        let key = parse_answer_key_str(CLASSIC_KEY, "test.csv").unwrap();
        assert_eq!(key.len(), 3);

        let q1 = key.get(&qid("Q1")).unwrap();
        assert_eq!(q1.expected_answer, "Paris");
        assert_eq!(q1.marks, 2.0);
        assert_eq!(q1.question_type, QuestionType::Objective);

        let q2 = key.get(&qid("Q2")).unwrap();
        assert_eq!(q2.question_type, QuestionType::Subjective);
        assert_eq!(q2.marks, 5.0);

        let q3 = key.get(&qid("Q3")).unwrap();
        assert_eq!(q3.marks, 1.0);
        assert_eq!(q3.question_type, QuestionType::Objective);
        assert_eq!(key.diagnostics().defaulted_marks, vec![qid("Q3")]);
    }

    #[test]
    fn later_row_with_marks_clears_default_warning() {
        let content = "QID,Answer,Marks\nQ1,Paris,\nQ1,Paris,2\nQ2,Rome,x\n";
        let key = parse_answer_key_str(content, "dup.csv").unwrap();
        assert_eq!(key.get(&qid("Q1")).unwrap().marks, 2.0);
        assert_eq!(key.diagnostics().defaulted_marks, vec![qid("Q2")]);
        assert_eq!(key.diagnostics().duplicate_ids, vec![qid("Q1")]);

        let warnings = validate_answer_key(&key);
        assert!(!warnings
            .iter()
            .any(|w| w.question_id == Some(qid("Q1")) && w.message.contains("defaulted")));
    }

    #[test]
    fn score_column_substitutes_for_marks() {
        let content = "id;expected answer;score;kind\n4;Oxygen;3.5;o\n5;Nitrogen;abc;x\n";
        let key = parse_answer_key_str(content, "semi.csv").unwrap();
        assert_eq!(key.get(&qid("Q4")).unwrap().marks, 3.5);
        assert_eq!(key.get(&qid("Q5")).unwrap().marks, 1.0);
        assert_eq!(
            key.get(&qid("Q5")).unwrap().question_type,
            QuestionType::Subjective
        );
    }

    #[test]
    fn marks_fall_back_to_score_per_row() {
        let content = "QID,Answer,Marks,Score,Type\n1,a,,4,O\n2,b,2,9,O\n";
        let key = parse_answer_key_str(content, "both.csv").unwrap();
        assert_eq!(key.get(&qid("Q1")).unwrap().marks, 4.0);
        assert_eq!(key.get(&qid("Q2")).unwrap().marks, 2.0);
    }

    #[test]
    fn non_positive_marks_default() {
        let content = "QID,Answer,Marks,Type\n1,a,0,O\n2,b,-3,O\n3,c,NaN,O\n";
        let key = parse_answer_key_str(content, "neg.csv").unwrap();
        for id in ["Q1", "Q2", "Q3"] {
            assert_eq!(key.get(&qid(id)).unwrap().marks, 1.0, "{id}");
        }
    }

    #[test]
    fn empty_ids_skipped_duplicates_overwrite() {
        let content = "QID,Answer,Marks,Type\n,orphan,1,O\n1,first,1,O\n 1 ,second,2,O\n";
        let key = parse_answer_key_str(content, "dup.csv").unwrap();
        assert_eq!(key.len(), 1);
        assert_eq!(key.get(&qid("Q1")).unwrap().expected_answer, "second");
        assert_eq!(key.diagnostics().skipped_rows, 1);
        assert_eq!(key.diagnostics().duplicate_ids, vec![qid("Q1")]);
    }

    #[test]
    fn every_loaded_row_is_retrievable() {
        let content = "QID,Answer,Marks,Type\n1,a,1,O\nq2,b,1,S\nQ.3,c,1,O\n 4b ,d,1,S\n";
        let key = parse_answer_key_str(content, "rt.csv").unwrap();
        for raw in ["1", "q2", "Q.3", " 4b "] {
            assert!(key.contains(&qid(raw)), "{raw} missing");
        }
    }

    #[test]
    fn missing_type_and_answer_columns_tolerated() {
        let key = parse_answer_key_str("QID,Marks\n1,2\n", "thin.csv").unwrap();
        let entry = key.get(&qid("Q1")).unwrap();
        assert_eq!(entry.expected_answer, "");
        assert_eq!(entry.question_type, QuestionType::Subjective);
    }

    #[test]
    fn bom_and_tabs() {
        let content = "\u{feff}QID\tAnswer\tMarks\tType\n1\tParis\t2\tO\n";
        let key = parse_answer_key_str(content, "tab.tsv").unwrap();
        assert_eq!(key.get(&qid("Q1")).unwrap().expected_answer, "Paris");
    }

    #[test]
    fn empty_source_is_malformed() {
        let err = parse_answer_key_str("", "empty.csv").unwrap_err();
        assert!(matches!(err, AnswerKeyError::MalformedSource { .. }));
    }

    #[test]
    fn header_without_id_is_malformed() {
        let err = parse_answer_key_str("Question,Answer\nWhat?,Yes\n", "noid.csv").unwrap_err();
        assert!(matches!(err, AnswerKeyError::MalformedSource { .. }));
        assert!(err.to_string().contains("no question id column"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_answer_key(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.csv");
        std::fs::write(&path, CLASSIC_KEY).unwrap();
        let key = load_answer_key(&path).unwrap();
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn validation_flags_problems() {
        let content = "QID,Answer,Marks,Type\n1,,1,O\n2,a an to,1,S\n3,ok,x,O\n3,ok,1,O\n";
        let key = parse_answer_key_str(content, "v.csv").unwrap();
        let warnings = validate_answer_key(&key);
        assert!(warnings.iter().any(|w| w.message.contains("empty expected answer")));
        assert!(warnings.iter().any(|w| w.message.contains("no keywords")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("defaulted")));
    }

    #[test]
    fn clean_key_has_no_warnings() {
        let key = parse_answer_key_str(CLASSIC_KEY.replace(",,", ",1,").as_str(), "c.csv").unwrap();
        assert!(validate_answer_key(&key).is_empty());
    }
}
