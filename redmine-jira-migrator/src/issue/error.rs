//! Taxonomy parsing error types.

use thiserror::Error;

/// Error returned when a status or priority cannot be parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {taxonomy} '{value}' (expected one of: {expected})")]
pub struct ParseCodeError {
    /// Which taxonomy was being parsed ("status" or "priority").
    pub taxonomy: &'static str,

    /// The rejected input.
    pub value: String,

    /// Human readable list of accepted values.
    pub expected: String,
}
