//! Issue Record → Jira create payload.

use crate::client::jira::{CreateIssueRequest, IssueFields, Named, ProjectKey};
use crate::issue::IssueRecord;
use crate::mapping::{MappingError, MappingTable};
use std::collections::BTreeMap;

/// A record ready to be sent to Jira.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePayload {
    /// Body of the create call.
    pub request: CreateIssueRequest,

    /// Jira status the issue should end up in.
    pub target_status: String,
}

/// Maps a record onto a create request for `project_key`.
///
/// The due date goes to Jira's `duedate` field. The start date has no
/// standard field and is only sent when `start_date_field` names the custom
/// field holding it. Reporter and assignee need a user lookup and are left
/// to the importer.
///
/// # Errors
///
/// Returns [`MappingError`] when the status or priority code has no mapping.
pub fn build_payload(
    record: &IssueRecord,
    mapping: &MappingTable,
    project_key: &str,
    start_date_field: Option<&str>,
) -> Result<IssuePayload, MappingError> {
    let target_status = mapping.map_status(record.status)?.to_string();
    let priority = mapping.map_priority(record.priority)?.to_string();

    let labels = record
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| vec![name.replace(' ', "_")])
        .unwrap_or_default();

    let mut custom = BTreeMap::new();
    if let (Some(field), Some(date)) = (start_date_field, record.start_date) {
        custom.insert(field.to_string(), date.to_string());
    }

    Ok(IssuePayload {
        request: CreateIssueRequest {
            fields: IssueFields {
                project: ProjectKey {
                    key: project_key.to_string(),
                },
                summary: record.subject.clone(),
                description: record.description.clone(),
                issue_type: Named {
                    name: mapping.issue_type(record.tracker.as_deref()).to_string(),
                },
                priority: Named { name: priority },
                labels,
                reporter: None,
                assignee: None,
                due_date: record.due_date,
                custom,
            },
        },
        target_status,
    })
}
