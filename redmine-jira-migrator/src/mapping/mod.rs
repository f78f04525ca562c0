//! Redmine → Jira value mapping.
//!
//! The table starts from built-in defaults, accepts overrides from the
//! settings file and is validated once at startup. Lookups by raw code fail
//! per record, never for the whole batch.

mod error;

pub use error::MappingError;

use crate::config::MappingSettings;
use crate::issue::{IssuePriority, IssueStatus};
use std::collections::BTreeMap;

/// Static lookup from Redmine codes to Jira names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    status: BTreeMap<IssueStatus, String>,
    priority: BTreeMap<IssuePriority, String>,
    /// Keyed by lowercase Redmine tracker name.
    issue_types: BTreeMap<String, String>,
    default_issue_type: String,
}

impl Default for MappingTable {
    fn default() -> Self {
        let status = [
            (IssueStatus::New, "To Do"),
            (IssueStatus::InProgress, "In Progress"),
            (IssueStatus::Resolved, "Done"),
            (IssueStatus::Feedback, "In Progress"),
            (IssueStatus::Closed, "Done"),
            (IssueStatus::Rejected, "Done"),
        ];
        let priority = [
            (IssuePriority::Low, "Lowest"),
            (IssuePriority::Normal, "Medium"),
            (IssuePriority::High, "High"),
            (IssuePriority::Urgent, "Highest"),
            (IssuePriority::Immediate, "Highest"),
        ];
        let issue_types = [("bug", "Bug"), ("feature", "Story"), ("support", "Task")];

        Self {
            status: status
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            priority: priority
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            issue_types: issue_types
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            default_issue_type: "Task".to_string(),
        }
    }
}

impl MappingTable {
    /// Builds the table from defaults plus the `[mapping]` overrides.
    ///
    /// Override keys may be taxonomy names or numeric codes.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidOverride`] for a key outside the taxonomy.
    pub fn from_settings(
        settings: &MappingSettings,
        default_issue_type: &str,
    ) -> Result<Self, MappingError> {
        let mut table = Self::default();
        for (key, name) in &settings.status {
            table.status.insert(key.parse::<IssueStatus>()?, name.clone());
        }
        for (key, name) in &settings.priority {
            table
                .priority
                .insert(key.parse::<IssuePriority>()?, name.clone());
        }
        table.issue_types.extend(
            settings
                .issue_type
                .iter()
                .map(|(tracker, issue_type)| (tracker.to_lowercase(), issue_type.clone())),
        );
        table.default_issue_type = default_issue_type.to_string();
        Ok(table)
    }

    /// Checks that every status and priority has a non-empty Jira name.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Incomplete`] naming the missing entries.
    pub fn validate(&self) -> Result<(), MappingError> {
        let missing_status: Vec<&str> = IssueStatus::ALL
            .iter()
            .filter(|status| is_blank(self.status.get(status)))
            .map(|status| status.name())
            .collect();
        if !missing_status.is_empty() {
            return Err(MappingError::Incomplete {
                taxonomy: "status",
                missing: missing_status.join(", "),
            });
        }

        let missing_priority: Vec<&str> = IssuePriority::ALL
            .iter()
            .filter(|priority| is_blank(self.priority.get(priority)))
            .map(|priority| priority.name())
            .collect();
        if !missing_priority.is_empty() {
            return Err(MappingError::Incomplete {
                taxonomy: "priority",
                missing: missing_priority.join(", "),
            });
        }

        if self.default_issue_type.trim().is_empty() {
            return Err(MappingError::Incomplete {
                taxonomy: "issue type",
                missing: "default".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the Jira status name for a Redmine status code.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnmappedStatus`] for unknown codes.
    pub fn map_status(&self, code: u32) -> Result<&str, MappingError> {
        IssueStatus::from_code(code)
            .and_then(|status| self.status.get(&status))
            .filter(|name| !name.trim().is_empty())
            .map(String::as_str)
            .ok_or(MappingError::UnmappedStatus { code })
    }

    /// Returns the Jira priority name for a Redmine priority code.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnmappedPriority`] for unknown codes.
    pub fn map_priority(&self, code: u32) -> Result<&str, MappingError> {
        IssuePriority::from_code(code)
            .and_then(|priority| self.priority.get(&priority))
            .filter(|name| !name.trim().is_empty())
            .map(String::as_str)
            .ok_or(MappingError::UnmappedPriority { code })
    }

    /// Returns the Jira issue type for a Redmine tracker name.
    #[must_use]
    pub fn issue_type(&self, tracker: Option<&str>) -> &str {
        tracker
            .and_then(|name| self.issue_types.get(&name.trim().to_lowercase()))
            .map_or(self.default_issue_type.as_str(), String::as_str)
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |name| name.trim().is_empty())
}
