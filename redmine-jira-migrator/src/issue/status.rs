//! Issue status taxonomy.

use super::{normalize_name, ParseCodeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a source issue, numbered as in a stock Redmine install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    /// Newly created, not yet worked on (code 1).
    New,

    /// Actively being worked on (code 2).
    InProgress,

    /// Resolved, awaiting confirmation (code 3).
    Resolved,

    /// Waiting for feedback (code 4).
    Feedback,

    /// Closed and complete (code 5).
    Closed,

    /// Rejected as invalid (code 6).
    Rejected,
}

impl IssueStatus {
    /// Every supported status, in code order.
    pub const ALL: [IssueStatus; 6] = [
        IssueStatus::New,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Feedback,
        IssueStatus::Closed,
        IssueStatus::Rejected,
    ];

    /// Returns the numeric Redmine code.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::New => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
            Self::Feedback => 4,
            Self::Closed => 5,
            Self::Rejected => 6,
        }
    }

    /// Looks up a status by its numeric code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Returns the canonical kebab-case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Feedback => "feedback",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }

    /// Lists the accepted codes, e.g. for CLI help.
    #[must_use]
    pub fn help_text() -> String {
        Self::ALL
            .iter()
            .map(|status| format!("{} ({})", status.code(), status.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IssueStatus {
    type Err = ParseCodeError;

    /// Accepts either the numeric code or the name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = match value.trim().parse::<u32>() {
            Ok(code) => Self::from_code(code),
            Err(_) => {
                let name = normalize_name(value);
                Self::ALL.into_iter().find(|status| status.name() == name)
            }
        };

        parsed.ok_or_else(|| ParseCodeError {
            taxonomy: "status",
            value: value.to_string(),
            expected: Self::help_text(),
        })
    }
}
