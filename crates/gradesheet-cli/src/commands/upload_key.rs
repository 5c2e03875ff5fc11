//! The `gradesheet upload-key` command.

use std::path::PathBuf;

use anyhow::Result;

use gradesheet_core::answer_key::load_answer_key;
use gradesheet_extract::load_config_from;
use gradesheet_report::AnswerKeyStore;

pub fn execute(file: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = AnswerKeyStore::new(&config.data_dir);

    let stored = store.import(&file)?;
    let key = load_answer_key(&stored)?;
    let name = stored
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!(
        "Stored answer key: {name} ({} questions, {} marks)",
        key.len(),
        key.total_marks()
    );
    Ok(())
}
