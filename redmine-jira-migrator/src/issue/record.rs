//! The issue record carried from Redmine to Jira.

use super::{IssuePriority, IssueStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A normalized tracker issue, the unit of migration.
///
/// Records are created by the extractor, written to the JSON cache and read
/// back unchanged by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Redmine issue ID.
    pub id: u64,

    /// Project identifier the issue was extracted from.
    pub project: String,

    /// Issue subject, becomes the Jira summary.
    pub subject: String,

    /// Issue description (empty when Redmine had none).
    #[serde(default)]
    pub description: String,

    /// Raw Redmine status code.
    pub status: u32,

    /// Raw Redmine priority code.
    pub priority: u32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Redmine tracker name (Bug, Feature, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,

    /// Redmine category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Redmine author display name, matched to a Jira reporter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Redmine assignee display name, matched to a Jira assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Attachment references. Not transferred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,

    /// Comment references. Not transferred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl IssueRecord {
    /// Returns the status if its code belongs to the canonical taxonomy.
    #[must_use]
    pub fn status_kind(&self) -> Option<IssueStatus> {
        IssueStatus::from_code(self.status)
    }

    /// Returns the priority if its code belongs to the canonical taxonomy.
    #[must_use]
    pub fn priority_kind(&self) -> Option<IssuePriority> {
        IssuePriority::from_code(self.priority)
    }
}
