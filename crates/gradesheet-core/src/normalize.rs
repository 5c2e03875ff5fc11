//! Noise stripping for raw extracted text.

use std::sync::LazyLock;

use regex::Regex;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid blank-run pattern"));

/// Normalize raw OCR or file text into clean, non-empty, trimmed lines.
///
/// Carriage returns become line breaks, runs of blank lines collapse, non-ASCII
/// characters are dropped and every surviving line is trimmed. Never fails:
/// empty input gives an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace('\r', "\n");
    let text = BLANK_RUNS.replace_all(&text, "\n");
    let ascii: String = text.chars().filter(char::is_ascii).collect();

    ascii
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n\n  \r\n"), "");
    }

    #[test]
    fn carriage_returns_become_breaks() {
        assert_eq!(normalize("Q1: a\rQ2: b\r\nQ3: c"), "Q1: a\nQ2: b\nQ3: c");
    }

    #[test]
    fn strips_non_ascii_and_trims() {
        assert_eq!(normalize("  Q1: caf\u{e9}  \n\u{2014}\u{2014}\nQ2:  x "), "Q1: caf\nQ2:  x");
    }

    #[test]
    fn drops_blank_lines() {
        let raw = "Q1: Paris\n\n\n\nQ2: London\n   \nQ3: Rome";
        assert_eq!(normalize(raw), "Q1: Paris\nQ2: London\nQ3: Rome");
    }

    #[test]
    fn idempotent() {
        let raw = "  1) alpha \r\r\n beta\n\n\ngamma\u{00a0}";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
}
