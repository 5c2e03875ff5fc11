//! gradesheet-extract: text extraction backends and configuration.
//!
//! Implements the `TextExtractor` trait for plain-text sheets and for scanned
//! images via the Tesseract OCR command-line tool, and loads the
//! `gradesheet.toml` configuration that wires them up.

pub mod auto;
pub mod config;
pub mod error;
pub mod mock;
pub mod plain;
pub mod tesseract;

pub use auto::{create_extractor, AutoExtractor};
pub use config::{load_config, load_config_from, GradesheetConfig, OcrConfig};
pub use error::ExtractError;
