//! Run summary types and helpers.

mod outcome;
mod run_summary;

pub use outcome::RecordOutcome;
pub use run_summary::{ImportSummary, RunSummary};
