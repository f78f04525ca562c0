//! Issue priority taxonomy.

use super::{normalize_name, ParseCodeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority of a source issue, numbered as in a stock Redmine install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssuePriority {
    Low,
    Normal,
    High,
    Urgent,
    Immediate,
}

impl IssuePriority {
    /// Every supported priority, in code order.
    pub const ALL: [IssuePriority; 5] = [
        IssuePriority::Low,
        IssuePriority::Normal,
        IssuePriority::High,
        IssuePriority::Urgent,
        IssuePriority::Immediate,
    ];

    /// Returns the numeric Redmine code.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Normal => 2,
            Self::High => 3,
            Self::Urgent => 4,
            Self::Immediate => 5,
        }
    }

    /// Looks up a priority by its numeric code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|priority| priority.code() == code)
    }

    /// Returns the canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Immediate => "immediate",
        }
    }

    /// Lists the accepted codes, e.g. for CLI help.
    #[must_use]
    pub fn help_text() -> String {
        Self::ALL
            .iter()
            .map(|priority| format!("{} ({})", priority.code(), priority.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IssuePriority {
    type Err = ParseCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = match value.trim().parse::<u32>() {
            Ok(code) => Self::from_code(code),
            Err(_) => {
                let name = normalize_name(value);
                Self::ALL.into_iter().find(|priority| priority.name() == name)
            }
        };

        parsed.ok_or_else(|| ParseCodeError {
            taxonomy: "priority",
            value: value.to_string(),
            expected: Self::help_text(),
        })
    }
}
