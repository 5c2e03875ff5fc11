//! Question segmentation.
//!
//! Splits normalized sheet text into `(question id, answer)` pairs. Each line
//! is offered to an ordered list of [`LineRule`]s; the first rule that
//! recognizes an id wins. Lines no rule recognizes get sequential ids numbered
//! past the highest id seen anywhere on the sheet.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{QuestionId, StudentAnswers};

static PREFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(Q\s*\.?\s*\d+[a-z]?)[).\s:\-]+(.*)$").expect("valid prefixed pattern")
});

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)[).\s:\-]+(.*)$").expect("valid numbered pattern")
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Q\s*\.?\s*\d+|\d+)$").expect("valid bare id pattern")
});

/// How a segment's id was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSource {
    /// `Q1: ...`, `Q.2) ...`
    Prefixed,
    /// `3. ...`, `4) ...`
    Numbered,
    /// `<id> : ...` accepted only when the left side is a bare id.
    ColonSplit,
    /// No id on the line; numbered after the highest explicit id.
    Sequential,
}

/// One answer recognized on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: QuestionId,
    pub answer: String,
    pub source: SegmentSource,
    /// 1-based line number in the segmented text.
    pub line: usize,
}

/// A line classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    Prefixed,
    Numbered,
    ColonSplit,
}

/// Rules in priority order.
pub const LINE_RULES: [LineRule; 3] = [LineRule::Prefixed, LineRule::Numbered, LineRule::ColonSplit];

impl LineRule {
    /// Try to recognize an id and answer on `line`.
    pub fn apply(&self, line: &str) -> Option<(QuestionId, String)> {
        match self {
            LineRule::Prefixed => capture_pair(&PREFIXED, line),
            LineRule::Numbered => capture_pair(&NUMBERED, line),
            LineRule::ColonSplit => {
                let (left, right) = line.split_once(':')?;
                let left = left.trim();
                if !BARE_ID.is_match(left) {
                    return None;
                }
                Some((QuestionId::parse(left)?, right.trim().to_string()))
            }
        }
    }

    fn source(&self) -> SegmentSource {
        match self {
            LineRule::Prefixed => SegmentSource::Prefixed,
            LineRule::Numbered => SegmentSource::Numbered,
            LineRule::ColonSplit => SegmentSource::ColonSplit,
        }
    }
}

fn capture_pair(pattern: &Regex, line: &str) -> Option<(QuestionId, String)> {
    let caps = pattern.captures(line)?;
    let id = QuestionId::parse(caps.get(1)?.as_str())?;
    let answer = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Some((id, answer.to_string()))
}

/// Segment text into ordered `(id, answer)` pairs.
///
/// Never fails: in the worst case every line becomes a sequentially numbered
/// answer. Whitespace-only lines are skipped.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut provisional: Vec<(Option<(QuestionId, SegmentSource)>, String, usize)> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let matched = LINE_RULES
            .iter()
            .find_map(|rule| rule.apply(line).map(|(id, answer)| (id, answer, rule.source())));

        match matched {
            Some((id, answer, source)) => {
                tracing::debug!(line = line_no, id = %id, ?source, "matched answer");
                provisional.push((Some((id, source)), answer, line_no));
            }
            None => {
                tracing::debug!(line = line_no, "unmatched line");
                provisional.push((None, trimmed.to_string(), line_no));
            }
        }
    }

    let max_seen = provisional
        .iter()
        .filter_map(|(id, _, _)| id.as_ref().and_then(|(id, _)| id.number()))
        .max()
        .unwrap_or(0);
    let mut taken: HashSet<QuestionId> = provisional
        .iter()
        .filter_map(|(found, _, _)| found.as_ref().map(|(id, _)| id.clone()))
        .collect();
    let mut next = max_seen.checked_add(1).unwrap_or(1);

    let segments: Vec<Segment> = provisional
        .into_iter()
        .map(|(found, answer, line)| match found {
            Some((id, source)) => Segment {
                id,
                answer,
                source,
                line,
            },
            None => {
                let id = next_free_id(&mut next, &mut taken);
                tracing::debug!(line, id = %id, "assigned sequential id");
                Segment {
                    id,
                    answer,
                    source: SegmentSource::Sequential,
                    line,
                }
            }
        })
        .collect();

    tracing::debug!("segmented {} answers", segments.len());
    segments
}

/// Next unused sequential id. The counter wraps to 1 past `u64::MAX` and
/// skips ids already on the sheet.
fn next_free_id(next: &mut u64, taken: &mut HashSet<QuestionId>) -> QuestionId {
    loop {
        let id = QuestionId::from_number(*next);
        *next = next.checked_add(1).unwrap_or(1);
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Collapse segments into a lookup map; later duplicates win.
pub fn into_answers(segments: &[Segment]) -> StudentAnswers {
    segments
        .iter()
        .map(|s| (s.id.clone(), s.answer.clone()))
        .collect()
}
