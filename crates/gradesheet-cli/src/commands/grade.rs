//! The `gradesheet grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradesheet_core::engine::{GradingEngine, SheetSpec};
use gradesheet_core::report::SheetReport;
use gradesheet_extract::{create_extractor, load_config_from};
use gradesheet_report::ResultsLedger;

use super::{engine_config, load_key};

pub async fn execute(
    key: String,
    sheet: PathBuf,
    student: Option<String>,
    no_save: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json"),
        "unknown format '{format}' (expected text or json)"
    );

    let config = load_config_from(config_path.as_deref())?;
    let (answer_key, key_name) = load_key(&config, &key)?;

    let target = match student.filter(|s| !s.trim().is_empty()) {
        Some(student) => SheetSpec {
            student: student.trim().to_string(),
            path: sheet,
        },
        None => SheetSpec::from_path(sheet),
    };

    let engine = GradingEngine::new(create_extractor(&config), engine_config(&config, 1));
    let report = engine
        .grade_sheet(&target, &answer_key)
        .await
        .with_context(|| format!("failed to grade {}", target.path.display()))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_sheet(&report, &key_name);
    }

    if !no_save {
        let ledger = ResultsLedger::new(&config.data_dir);
        let details = ledger.record(
            &report.student,
            &config.evaluator_name(),
            &key_name,
            &report.grade,
        )?;
        eprintln!("Details saved to: {}", details.display());
    }

    Ok(())
}

fn print_sheet(report: &SheetReport, key_name: &str) {
    use comfy_table::{Cell, Table};

    let grade = &report.grade;
    println!("Student: {}", report.student);
    println!("Answer key: {key_name}");

    let mut table = Table::new();
    table.set_header(vec!["QID", "Answer", "Score", "Remark", "Expected"]);
    for (id, r) in &grade.results {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(&r.student_answer),
            Cell::new(format!("{}/{}", r.score, r.marks)),
            Cell::new(&r.remark),
            Cell::new(&r.correct_answer),
        ]);
    }
    println!("{table}");

    println!(
        "Total: {} / {} ({:.1}%)",
        grade.total_score,
        grade.max_score,
        grade.percentage()
    );
    for w in &report.warnings {
        println!("Warning: {w}");
    }
}
