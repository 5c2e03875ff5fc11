//! The `gradesheet segment` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradesheet_core::normalize::normalize;
use gradesheet_core::segment::segment;
use gradesheet_extract::{create_extractor, load_config_from};

pub async fn execute(sheet: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let config = load_config_from(config_path.as_deref())?;
    let extracted = create_extractor(&config)
        .extract(&sheet)
        .await
        .with_context(|| format!("failed to read {}", sheet.display()))?;

    let cleaned = normalize(&extracted.text);
    let segments = segment(&cleaned);

    if segments.is_empty() {
        println!("No answers detected.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Line", "QID", "Rule", "Answer"]);
    for s in &segments {
        table.add_row(vec![
            Cell::new(s.line),
            Cell::new(&s.id),
            Cell::new(format!("{:?}", s.source)),
            Cell::new(&s.answer),
        ]);
    }
    println!("{table}");
    println!("{} answer(s) detected.", segments.len());

    Ok(())
}
