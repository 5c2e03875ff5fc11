//! The `gradesheet list-keys` command.

use std::path::PathBuf;

use anyhow::Result;

use gradesheet_extract::load_config_from;
use gradesheet_report::AnswerKeyStore;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = AnswerKeyStore::new(&config.data_dir);
    let keys = store.list()?;

    if keys.is_empty() {
        println!("No answer keys stored in {}", store.dir().display());
        return Ok(());
    }

    println!("Answer keys in {}:", store.dir().display());
    for name in &keys {
        println!("  {name}");
    }
    Ok(())
}
