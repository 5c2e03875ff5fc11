//! The `gradesheet batch` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use gradesheet_core::engine::{GradingEngine, ProgressReporter, SheetSpec};
use gradesheet_core::report::{BatchReport, SheetReport};
use gradesheet_extract::{create_extractor, load_config_from, AutoExtractor};
use gradesheet_report::html::write_html_report;
use gradesheet_report::ResultsLedger;

use super::{engine_config, load_key};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_sheet_start(&self, student: &str) {
        eprintln!("  Grading: {student}");
    }

    fn on_sheet_complete(&self, report: &SheetReport) {
        eprintln!(
            "  Done: {} {}/{}",
            report.student, report.grade.total_score, report.grade.max_score
        );
    }

    fn on_sheet_error(&self, student: &str, error: &str) {
        eprintln!("  ERROR: {student}: {error}");
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

/// Answer sheets in a directory, sorted by file name.
fn collect_sheets(dir: &Path) -> Result<Vec<SheetSpec>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read sheet directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && AutoExtractor::supports(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    tracing::debug!("found {} sheet(s) in {}", paths.len(), dir.display());
    Ok(paths.into_iter().map(SheetSpec::from_path).collect())
}

pub async fn execute(
    key: String,
    sheets_dir: PathBuf,
    parallelism: Option<usize>,
    output: PathBuf,
    format: String,
    no_save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(bad) = formats.iter().find(|f| !matches!(**f, "json" | "html")) {
        anyhow::bail!("unknown format '{bad}' (expected json, html or all)");
    }

    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let (answer_key, key_name) = load_key(&config, &key)?;
    let sheets = collect_sheets(&sheets_dir)?;
    anyhow::ensure!(
        !sheets.is_empty(),
        "no answer sheets found in {}",
        sheets_dir.display()
    );

    eprintln!(
        "gradesheet v{}: grading {} sheets against {} ({} questions)",
        env!("CARGO_PKG_VERSION"),
        sheets.len(),
        key_name,
        answer_key.len()
    );
    eprintln!();

    let engine = GradingEngine::new(
        create_extractor(&config),
        engine_config(&config, parallelism),
    );
    let report = engine
        .run(&sheets, &answer_key, &key_name, &ConsoleReporter)
        .await?;

    print_summary(&report, config.pass_ratio);

    if !no_save {
        let ledger = ResultsLedger::new(&config.data_dir);
        let evaluator = config.evaluator_name();
        for sheet in &report.sheets {
            ledger.record(&sheet.student, &evaluator, &key_name, &sheet.grade)?;
        }
        eprintln!(
            "Recorded {} result(s) in {}",
            report.sheets.len(),
            ledger.results_path().display()
        );
    }

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, config.pass_ratio, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }

    Ok(())
}

fn print_summary(report: &BatchReport, pass_ratio: f64) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Student", "Score", "%", "Unanswered", "Warnings"]);

    for sheet in &report.sheets {
        let grade = &sheet.grade;
        table.add_row(vec![
            Cell::new(&sheet.student),
            Cell::new(format!("{}/{}", grade.total_score, grade.max_score)),
            Cell::new(format!("{:.1}", grade.percentage())),
            Cell::new(grade.unanswered()),
            Cell::new(sheet.warnings.len()),
        ]);
    }
    for failure in &report.failures {
        table.add_row(vec![
            Cell::new(&failure.student),
            Cell::new("not graded"),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new(&failure.error),
        ]);
    }

    println!("{table}");

    if let Some(a) = report.class_analysis(pass_ratio) {
        println!(
            "Class average: {} | highest: {} | lowest: {} | passed: {}/{} (pass mark {:.2})",
            a.average_score,
            a.highest_score,
            a.lowest_score,
            a.passed,
            a.total_students,
            a.pass_threshold
        );
    }
}
