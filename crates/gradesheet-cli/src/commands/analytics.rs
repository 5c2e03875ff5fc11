//! The `gradesheet analytics` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use gradesheet_core::statistics::class_analysis;
use gradesheet_extract::load_config_from;
use gradesheet_report::ResultsLedger;

pub fn execute(pass_ratio: Option<f64>, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let config = load_config_from(config_path.as_deref())?;
    let pass_ratio = pass_ratio.unwrap_or(config.pass_ratio);
    anyhow::ensure!(
        pass_ratio > 0.0 && pass_ratio <= 1.0,
        "pass ratio must be in (0, 1]"
    );

    let ledger = ResultsLedger::new(&config.data_dir);
    let summaries = ledger.summaries()?;
    let totals: Vec<f64> = summaries.iter().map(|s| s.total_score).collect();

    let Some(analysis) = class_analysis(&totals, pass_ratio) else {
        println!("No results recorded yet.");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total students"), Cell::new(analysis.total_students)]);
    table.add_row(vec![Cell::new("Average score"), Cell::new(analysis.average_score)]);
    table.add_row(vec![Cell::new("Highest score"), Cell::new(analysis.highest_score)]);
    table.add_row(vec![Cell::new("Lowest score"), Cell::new(analysis.lowest_score)]);
    table.add_row(vec![
        Cell::new("Pass mark"),
        Cell::new(format!("{:.2}", analysis.pass_threshold)),
    ]);
    table.add_row(vec![Cell::new("Passed"), Cell::new(analysis.passed)]);
    table.add_row(vec![Cell::new("Failed"), Cell::new(analysis.failed)]);
    table.add_row(vec![
        Cell::new("Pass rate"),
        Cell::new(format!("{:.1}%", analysis.pass_rate())),
    ]);
    println!("{table}");

    let mut per_key: BTreeMap<&str, usize> = BTreeMap::new();
    for s in &summaries {
        *per_key.entry(s.answer_key.as_str()).or_default() += 1;
    }
    if per_key.len() > 1 {
        println!("Results by answer key:");
        for (key, count) in per_key {
            println!("  {key}: {count}");
        }
    }

    Ok(())
}
