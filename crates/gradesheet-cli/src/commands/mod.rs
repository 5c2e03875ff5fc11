pub mod analytics;
pub mod batch;
pub mod grade;
pub mod init;
pub mod list_keys;
pub mod segment;
pub mod upload_key;
pub mod validate_key;

use anyhow::{Context, Result};

use gradesheet_core::answer_key::load_answer_key;
use gradesheet_core::engine::GradingEngineConfig;
use gradesheet_core::model::AnswerKey;
use gradesheet_extract::GradesheetConfig;
use gradesheet_report::AnswerKeyStore;

/// Resolve and load an answer key. Returns the key and its file name.
pub fn load_key(config: &GradesheetConfig, key: &str) -> Result<(AnswerKey, String)> {
    let store = AnswerKeyStore::new(&config.data_dir);
    let path = store.resolve(key)?;
    let answer_key =
        load_answer_key(&path).with_context(|| format!("failed to load answer key '{key}'"))?;
    anyhow::ensure!(
        !answer_key.is_empty(),
        "answer key {} has no questions",
        path.display()
    );
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.to_string());
    Ok((answer_key, name))
}

/// Engine settings derived from the loaded configuration.
pub fn engine_config(config: &GradesheetConfig, parallelism: usize) -> GradingEngineConfig {
    GradingEngineConfig {
        parallelism,
        scoring: config.scoring.clone(),
        ..Default::default()
    }
}
