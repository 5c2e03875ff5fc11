//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gradesheet_core::scoring::ScoringConfig;
use gradesheet_core::statistics::DEFAULT_PASS_RATIO;

/// OCR tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Path or name of the Tesseract binary.
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,
    /// Page segmentation mode (6 = single uniform block of text).
    #[serde(default = "default_psm")]
    pub psm: u32,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}
fn default_psm() -> u32 {
    6
}
fn default_lang() -> String {
    "eng".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: default_tesseract_cmd(),
            psm: default_psm(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Top-level gradesheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradesheetConfig {
    /// Where results, detail files and stored answer keys live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Name recorded as the evaluator in the results ledger.
    #[serde(default)]
    pub evaluator: Option<String>,
    /// Max sheets graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Pass mark as a share of the top score in class analytics.
    #[serde(default = "default_pass_ratio")]
    pub pass_ratio: f64,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_parallelism() -> usize {
    4
}
fn default_pass_ratio() -> f64 {
    DEFAULT_PASS_RATIO
}

impl Default for GradesheetConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            evaluator: None,
            parallelism: default_parallelism(),
            pass_ratio: default_pass_ratio(),
            ocr: OcrConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl GradesheetConfig {
    /// Evaluator name for the ledger, falling back to the login user.
    pub fn evaluator_name(&self) -> String {
        self.evaluator
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in every string-valued field.
fn resolve_config(config: &mut GradesheetConfig) {
    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
    config.evaluator = config.evaluator.as_deref().map(resolve_env_vars);
    config.ocr.tesseract_cmd = resolve_env_vars(&config.ocr.tesseract_cmd);
    config.ocr.lang = resolve_env_vars(&config.ocr.lang);
}

/// Apply OCR command overrides; the first variable that is set wins.
fn apply_env_overrides(config: &mut GradesheetConfig, lookup: impl Fn(&str) -> Option<String>) {
    let cmd = ["GRADESHEET_TESSERACT_CMD", "TESSERACT_CMD"]
        .into_iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));
    if let Some(cmd) = cmd {
        tracing::debug!("OCR command overridden from environment: {cmd}");
        config.ocr.tesseract_cmd = cmd;
    }
}

/// Parse configuration from a TOML string.
pub fn parse_config_str(content: &str) -> Result<GradesheetConfig> {
    toml::from_str(content).context("invalid gradesheet configuration")
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradesheet.toml` in the current directory
/// 2. `~/.config/gradesheet/config.toml`
///
/// Environment variable overrides: `GRADESHEET_TESSERACT_CMD`, `TESSERACT_CMD`.
pub fn load_config() -> Result<GradesheetConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradesheetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradesheet.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<GradesheetConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => GradesheetConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok());
    resolve_config(&mut config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradesheet"))
}
