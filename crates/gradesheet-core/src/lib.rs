//! gradesheet-core: answer keys, sheet segmentation, and scoring.
//!
//! This crate holds the grading pipeline that every other gradesheet crate
//! builds on: normalize raw sheet text, split it into per-question answers,
//! load an answer key, and score the answers against it.

pub mod answer_key;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod report;
pub mod results;
pub mod scoring;
pub mod segment;
pub mod statistics;
pub mod traits;
