//! Mapping error types.

use crate::issue::ParseCodeError;
use thiserror::Error;

/// Errors raised while translating Redmine codes into Jira values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The record's status code has no Jira counterpart.
    #[error("No Jira status mapped for Redmine status code {code}")]
    UnmappedStatus { code: u32 },

    /// The record's priority code has no Jira counterpart.
    #[error("No Jira priority mapped for Redmine priority code {code}")]
    UnmappedPriority { code: u32 },

    /// A `[mapping]` override names a value outside the taxonomy.
    #[error("Invalid mapping override: {0}")]
    InvalidOverride(#[from] ParseCodeError),

    /// The table does not cover the whole taxonomy.
    #[error("Incomplete {taxonomy} mapping, missing: {missing}")]
    Incomplete {
        taxonomy: &'static str,
        missing: String,
    },
}
