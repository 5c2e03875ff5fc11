//! gradesheet-report: persistence and rendering of grading results.
//!
//! The append-only results ledger (summary CSV plus per-student detail
//! CSVs), the answer-key store, and the self-contained HTML batch report.

pub mod html;
pub mod ledger;
pub mod store;

pub use html::{generate_html, write_html_report};
pub use ledger::{safe_name, DetailRow, ResultSummary, ResultsLedger};
pub use store::AnswerKeyStore;
