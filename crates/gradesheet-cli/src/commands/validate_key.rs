//! The `gradesheet validate-key` command.

use std::path::PathBuf;

use anyhow::Result;

use gradesheet_core::answer_key::{load_answer_key, validate_answer_key};
use gradesheet_extract::load_config_from;
use gradesheet_report::AnswerKeyStore;

pub fn execute(key: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = AnswerKeyStore::new(&config.data_dir).resolve(&key)?;
    let answer_key = load_answer_key(&path)?;

    println!(
        "Answer key: {} ({} questions, {} marks)",
        path.display(),
        answer_key.len(),
        answer_key.total_marks()
    );

    let warnings = validate_answer_key(&answer_key);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Answer key valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
