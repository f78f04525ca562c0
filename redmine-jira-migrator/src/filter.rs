//! Extraction filter criteria.

use crate::issue::{IssuePriority, IssueRecord, IssueStatus};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Project, status and priority filters applied while extracting.
///
/// An empty status or priority set means "no filter" for that dimension.
/// The criteria are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    project: String,
    statuses: BTreeSet<IssueStatus>,
    priorities: BTreeSet<IssuePriority>,
}

impl FilterCriteria {
    /// Creates criteria for a project.
    pub fn new(
        project: impl Into<String>,
        statuses: impl IntoIterator<Item = IssueStatus>,
        priorities: impl IntoIterator<Item = IssuePriority>,
    ) -> Self {
        Self {
            project: project.into(),
            statuses: statuses.into_iter().collect(),
            priorities: priorities.into_iter().collect(),
        }
    }

    /// Returns the project identifier.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the requested statuses.
    pub fn statuses(&self) -> &BTreeSet<IssueStatus> {
        &self.statuses
    }

    /// Returns the requested priorities.
    pub fn priorities(&self) -> &BTreeSet<IssuePriority> {
        &self.priorities
    }

    /// Returns true if the record satisfies every filter.
    ///
    /// Records whose codes fall outside the taxonomy never match a non-empty
    /// filter.
    #[must_use]
    pub fn matches(&self, record: &IssueRecord) -> bool {
        if record.project != self.project {
            return false;
        }

        let status_ok = self.statuses.is_empty()
            || record
                .status_kind()
                .is_some_and(|status| self.statuses.contains(&status));

        let priority_ok = self.priorities.is_empty()
            || record
                .priority_kind()
                .is_some_and(|priority| self.priorities.contains(&priority));

        status_ok && priority_ok
    }

    /// Keeps only matching records, preserving order.
    #[must_use]
    pub fn apply(&self, records: Vec<IssueRecord>) -> Vec<IssueRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }

    /// Builds the Redmine `issues.json` query parameters for these criteria.
    ///
    /// Redmine filters a single status or priority server-side. With several
    /// values every status is requested and [`FilterCriteria::apply`] narrows
    /// the result.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("project_id", self.project.clone()),
            ("subproject_id", "!*".to_string()),
        ];

        // Redmine only returns open issues unless asked otherwise.
        let status_id = match single(&self.statuses) {
            Some(status) => status.code().to_string(),
            None => "*".to_string(),
        };
        params.push(("status_id", status_id));

        if let Some(priority) = single(&self.priorities) {
            params.push(("priority_id", priority.code().to_string()));
        }

        params
    }

    /// Default cache file name, `<project>_<status>_issues.json`.
    #[must_use]
    pub fn default_cache_file(&self) -> PathBuf {
        let status = single(&self.statuses).map_or("any", |status| status.name());
        PathBuf::from(format!("{}_{}_issues.json", self.project, status))
    }
}

fn single<T: Copy>(set: &BTreeSet<T>) -> Option<T> {
    if set.len() == 1 {
        set.iter().next().copied()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: u64, status: u32, priority: u32) -> IssueRecord {
        let at = Utc.with_ymd_and_hms(2023, 6, 30, 10, 0, 0).unwrap();
        IssueRecord {
            id,
            project: "DEMO".to_string(),
            subject: format!("Issue {id}"),
            description: String::new(),
            status,
            priority,
            created_at: at,
            updated_at: at,
            tracker: None,
            category: None,
            author: None,
            assignee: None,
            start_date: None,
            due_date: None,
            attachments: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn sample() -> Vec<IssueRecord> {
        vec![
            record(1, 1, 2),
            record(2, 5, 2),
            record(3, 5, 4),
            record(4, 2, 4),
            record(5, 42, 4),
            record(6, 5, 99),
        ]
    }

    #[test]
    fn empty_filters_match_everything_in_project() {
        let criteria = FilterCriteria::new("DEMO", [], []);
        assert_eq!(criteria.apply(sample()).len(), 6);

        let mut other = record(7, 1, 1);
        other.project = "OTHER".to_string();
        assert!(!criteria.matches(&other));
    }

    #[test]
    fn status_and_priority_filters_have_no_false_positives() {
        let criteria = FilterCriteria::new(
            "DEMO",
            [IssueStatus::Closed],
            [IssuePriority::Urgent, IssuePriority::Normal],
        );

        let kept = criteria.apply(sample());

        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3]);
        for record in &kept {
            assert_eq!(record.status_kind(), Some(IssueStatus::Closed));
            assert!(matches!(
                record.priority_kind(),
                Some(IssuePriority::Urgent | IssuePriority::Normal)
            ));
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let criteria = FilterCriteria::new("DEMO", [IssueStatus::Closed], []);

        let once = criteria.apply(sample());
        let twice = criteria.apply(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn single_values_become_query_params() {
        let criteria = FilterCriteria::new("DEMO", [IssueStatus::Closed], [IssuePriority::High]);
        let params = criteria.query_params();

        assert!(params.contains(&("project_id", "DEMO".to_string())));
        assert!(params.contains(&("subproject_id", "!*".to_string())));
        assert!(params.contains(&("status_id", "5".to_string())));
        assert!(params.contains(&("priority_id", "3".to_string())));
    }

    #[test]
    fn several_statuses_request_everything() {
        let criteria =
            FilterCriteria::new("DEMO", [IssueStatus::New, IssueStatus::Closed], []);
        let params = criteria.query_params();

        assert!(params.contains(&("status_id", "*".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "priority_id"));
    }

    #[test]
    fn default_cache_file_names_status() {
        let closed = FilterCriteria::new("DEMO", [IssueStatus::Closed], []);
        assert_eq!(
            closed.default_cache_file(),
            PathBuf::from("DEMO_closed_issues.json")
        );

        let any = FilterCriteria::new("DEMO", [], []);
        assert_eq!(any.default_cache_file(), PathBuf::from("DEMO_any_issues.json"));
    }
}
