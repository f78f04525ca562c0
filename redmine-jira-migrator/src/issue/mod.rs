//! Issue records and the canonical status/priority taxonomies.
//!
//! Codes follow the stock Redmine numbering. Records keep the raw numeric
//! codes so that a cache file can carry values outside the taxonomy; those
//! are rejected later, one record at a time.

mod error;
mod priority;
mod record;
mod status;

pub use error::ParseCodeError;
pub use priority::IssuePriority;
pub use record::IssueRecord;
pub use status::IssueStatus;

/// Normalizes a user-supplied taxonomy name (`In Progress`, `in_progress`).
pub(crate) fn normalize_name(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}
