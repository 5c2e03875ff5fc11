//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use gradesheet_core::report::{BatchReport, SheetReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a batch report.
pub fn generate_html(report: &BatchReport, pass_ratio: f64) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>gradesheet report: {}</title>\n",
        html_escape(&report.answer_key.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>gradesheet report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Answer key: <strong>{}</strong> | {} questions | {} marks | {} sheets | {}</p>\n",
        html_escape(&report.answer_key.name),
        report.answer_key.question_count,
        report.answer_key.total_marks,
        report.sheets.len() + report.failures.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Class summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    match report.class_analysis(pass_ratio) {
        Some(a) => {
            html.push_str("<table class=\"summary\">\n");
            html.push_str("<thead><tr><th>Students</th><th>Average</th><th>Highest</th><th>Lowest</th><th>Pass mark</th><th>Passed</th><th>Failed</th><th>Pass rate</th></tr></thead>\n");
            html.push_str(&format!(
                "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr></tbody></table>\n",
                a.total_students,
                a.average_score,
                a.highest_score,
                a.lowest_score,
                a.pass_threshold,
                a.passed,
                a.failed,
                a.pass_rate(),
            ));
            html.push_str(&generate_bar_chart(&report.sheets));
        }
        None => html.push_str("<p>No sheets were graded.</p>\n"),
    }
    html.push_str("</section>\n");

    // Per-student results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Score</th><th onclick=\"sortTable(2)\">%</th><th onclick=\"sortTable(3)\">Unanswered</th><th>Warnings</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for sheet in &report.sheets {
        let grade = &sheet.grade;
        let class = if grade.percentage() >= 50.0 { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}/{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&sheet.student),
            grade.total_score,
            grade.max_score,
            grade.percentage(),
            grade.unanswered(),
            html_escape(&sheet.warnings.join("; ")),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-question statistics
    let stats = report.question_stats();
    if !stats.is_empty() {
        html.push_str("<section class=\"questions\">\n");
        html.push_str("<h2>Questions</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Question</th><th>Marks</th><th>Attempts</th><th>Average</th><th>Full marks</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (id, s) in &stats {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(id.as_str()),
                s.marks,
                s.attempts,
                s.average_score,
                s.full_marks
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Failures
    if !report.failures.is_empty() {
        html.push_str("<section class=\"failures\">\n");
        html.push_str("<h2>Not graded</h2>\n<ul>\n");
        for f in &report.failures {
            html.push_str(&format!(
                "<li class=\"fail\"><strong>{}</strong> ({}): {}</li>\n",
                html_escape(&f.student),
                html_escape(&f.source.display().to_string()),
                html_escape(&f.error)
            ));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Per-student details
    html.push_str("<section class=\"details\">\n");
    html.push_str("<h2>Details</h2>\n");
    for sheet in &report.sheets {
        html.push_str(&format!(
            "<details>\n<summary>{} ({}/{})</summary>\n",
            html_escape(&sheet.student),
            sheet.grade.total_score,
            sheet.grade.max_score
        ));
        html.push_str("<table>\n<thead><tr><th>Question</th><th>Answer</th><th>Score</th><th>Remark</th><th>Expected</th></tr></thead>\n<tbody>\n");
        for (id, r) in &sheet.grade.results {
            let class = if r.verdict.is_full_credit() { "pass" } else if r.score > 0.0 { "" } else { "fail" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td></tr>\n",
                class,
                html_escape(id.as_str()),
                html_escape(&r.student_answer),
                r.score,
                r.marks,
                html_escape(&r.remark),
                html_escape(&r.correct_answer)
            ));
        }
        html.push_str("</tbody></table>\n</details>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &BatchReport, pass_ratio: f64, path: &Path) -> Result<()> {
    let html = generate_html(report, pass_ratio);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(sheets: &[SheetReport]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = sheets.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, sheet) in sheets.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let share = (sheet.grade.percentage() / 100.0).clamp(0.0, 1.0);
        let width = (share * max_width as f64) as usize;

        let color = if share >= 0.7 {
            "#22c55e"
        } else if share >= 0.4 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&sheet.student)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            share * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const key = (r) => {
    const t = r.cells[col].textContent;
    const n = parseFloat(t);
    return isNaN(n) ? t : n;
  };
  rows.sort((a, b) => {
    const va = key(a), vb = key(b);
    const cmp = typeof va === 'number' && typeof vb === 'number' ? va - vb : String(va).localeCompare(String(vb));
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use gradesheet_core::answer_key::parse_answer_key_str;
    use gradesheet_core::report::{AnswerKeySummary, SheetFailure};
    use gradesheet_core::scoring::{grade, ScoringConfig};
    use gradesheet_core::segment::{into_answers, segment};
    use std::path::PathBuf;

    fn make_sheet(student: &str, text: &str) -> SheetReport {
        let key = parse_answer_key_str(
            "QID,Answer,Marks,Type\nQ1,Paris,2,O\nQ2,<b>bold</b> claim,3,S\n",
            "key.csv",
        )
        .unwrap();
        let segments = segment(text);
        let grade = grade(&into_answers(&segments), &key, &ScoringConfig::default());
        SheetReport {
            student: student.into(),
            source: PathBuf::from(format!("{student}.txt")),
            extractor: "plain".into(),
            extracted_chars: text.len(),
            segments,
            grade,
            warnings: vec![],
        }
    }

    fn make_test_report() -> BatchReport {
        BatchReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            answer_key: AnswerKeySummary {
                name: "midterm.csv".into(),
                question_count: 2,
                total_marks: 5.0,
            },
            sheets: vec![
                make_sheet("alice", "Q1: Paris\nQ2: a bold claim"),
                make_sheet("bob <script>", "Q1: Rome"),
            ],
            failures: vec![SheetFailure {
                student: "carol".into(),
                source: PathBuf::from("carol.png"),
                error: "OCR tool 'tesseract' is not available".into(),
            }],
            duration_ms: 1000,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_report(), 0.33);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("midterm.csv"));
        assert!(html.contains("alice"));
        assert!(html.contains("Not graded"));
        assert!(html.contains("carol"));
        assert!(html.contains("Questions"));
    }

    #[test]
    fn html_escapes_user_content() {
        let html = generate_html(&make_test_report(), 0.33);
        assert!(html.contains("bob &lt;script&gt;"));
        assert!(!html.contains("bob <script>"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn empty_report_has_no_summary() {
        let mut report = make_test_report();
        report.sheets.clear();
        report.failures.clear();
        let html = generate_html(&report, 0.33);
        assert!(html.contains("No sheets were graded."));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&make_test_report(), 0.33, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
