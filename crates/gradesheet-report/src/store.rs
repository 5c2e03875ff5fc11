//! Stored answer keys.
//!
//! Uploaded keys are copied into `<data_dir>/answer_keys` under a
//! timestamped name so earlier uploads are never overwritten.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gradesheet_core::answer_key::load_answer_key;
use gradesheet_core::error::AnswerKeyError;

/// Directory of imported answer keys.
pub struct AnswerKeyStore {
    dir: PathBuf,
}

impl AnswerKeyStore {
    /// The store under a data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("answer_keys"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy a CSV key into the store as `<stem>_<unix-ts>.csv`.
    ///
    /// The key must load cleanly before it is stored.
    pub fn import(&self, src: &Path) -> Result<PathBuf> {
        if !src.exists() {
            return Err(AnswerKeyError::SourceNotFound {
                path: src.to_path_buf(),
            }
            .into());
        }
        let is_csv = src
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        anyhow::ensure!(is_csv, "answer key must be a .csv file: {}", src.display());

        let key = load_answer_key(src)?;
        anyhow::ensure!(!key.is_empty(), "answer key has no questions: {}", src.display());

        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "answer_key".to_string());
        let dest = self
            .dir
            .join(format!("{stem}_{}.csv", chrono::Utc::now().timestamp()));

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        std::fs::copy(src, &dest)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;

        tracing::info!("stored answer key {} ({} questions)", dest.display(), key.len());
        Ok(dest)
    }

    /// File names of stored keys, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read {}", self.dir.display()))?
        {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                if let Some(name) = path.file_name() {
                    names.push(name.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Find a key by path, stored file name, or upload stem.
    ///
    /// A bare stem such as `midterm` resolves to the most recent
    /// `midterm_<ts>.csv` upload.
    pub fn resolve(&self, name_or_path: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(name_or_path);
        if direct.is_file() {
            return Ok(direct);
        }

        for candidate in [
            self.dir.join(name_or_path),
            self.dir.join(format!("{name_or_path}.csv")),
        ] {
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        let prefix = format!("{name_or_path}_");
        let latest = self
            .list()?
            .into_iter()
            .filter(|n| {
                n.strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(".csv"))
                    .is_some_and(|ts| !ts.is_empty() && ts.bytes().all(|b| b.is_ascii_digit()))
            })
            .max_by_key(|n| upload_timestamp(n));
        if let Some(name) = latest {
            return Ok(self.dir.join(name));
        }

        Err(AnswerKeyError::SourceNotFound { path: direct }.into())
    }
}

fn upload_timestamp(name: &str) -> u64 {
    name.trim_end_matches(".csv")
        .rsplit('_')
        .next()
        .and_then(|ts| ts.parse().ok())
        .unwrap_or(0)
}
