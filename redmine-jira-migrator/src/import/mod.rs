//! Jira import.
//!
//! Reads Issue Records from the cache and creates one Jira issue per record,
//! in cache order. Mapping failures skip a record and rejected creation calls
//! fail it; neither stops the batch. Authentication errors and exhausted
//! retries abort the import, whether they hit issue creation, a status
//! transition or a user lookup. The checkpoint is left at the last processed
//! record, so `--resume` picks up where the run stopped. An issue created
//! just before a transition aborts counts as processed.

mod checkpoint;
mod error;
mod payload;

pub use checkpoint::Checkpoint;
pub use error::ImportError;
pub use payload::{build_payload, IssuePayload};

use crate::cache::read_cache;
use crate::client::jira::AccountRef;
use crate::client::{ApiError, JiraClient};
use crate::issue::IssueRecord;
use crate::mapping::MappingTable;
use crate::rate_limit::RateLimiter;
use crate::summary::{ImportSummary, RecordOutcome};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Default Jira status of a freshly created issue.
pub const DEFAULT_INITIAL_STATUS: &str = "To Do";

/// Creates Jira issues through the shared rate limiter.
pub struct Importer<'a> {
    client: &'a JiraClient,
    limiter: &'a RateLimiter,
    mapping: &'a MappingTable,
    project_key: String,
    initial_status: String,
    map_users: bool,
    start_date_field: Option<String>,
    /// Redmine user name → Jira account id, `None` when nobody matched.
    users: Mutex<HashMap<String, Option<String>>>,
}

/// An error that stops the import, with the outcome of the record it hit
/// when the Jira issue had already been created.
struct Abort {
    created: Option<RecordOutcome>,
    source: ApiError,
}

impl From<ApiError> for Abort {
    fn from(source: ApiError) -> Self {
        Self {
            created: None,
            source,
        }
    }
}

impl<'a> Importer<'a> {
    /// Creates an importer targeting the Jira project `project_key`.
    pub fn new(
        client: &'a JiraClient,
        limiter: &'a RateLimiter,
        mapping: &'a MappingTable,
        project_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            limiter,
            mapping,
            project_key: project_key.into(),
            initial_status: DEFAULT_INITIAL_STATUS.to_string(),
            map_users: false,
            start_date_field: None,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the status Jira gives new issues. Records mapping to another
    /// status are transitioned after creation.
    #[must_use]
    pub fn with_initial_status(mut self, initial_status: impl Into<String>) -> Self {
        self.initial_status = initial_status.into();
        self
    }

    /// Enables looking up Redmine authors and assignees as Jira users.
    #[must_use]
    pub fn with_user_mapping(mut self, map_users: bool) -> Self {
        self.map_users = map_users;
        self
    }

    /// Sets the custom field receiving Redmine start dates.
    #[must_use]
    pub fn with_start_date_field(mut self, field: Option<String>) -> Self {
        self.start_date_field = field;
        self
    }

    /// Imports every record of the cache file at `cache`.
    ///
    /// With `resume`, records counted in the file's [`Checkpoint`] are passed
    /// over. Otherwise the checkpoint is ignored and overwritten. A completed
    /// import removes the checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the cache or checkpoint cannot be used, or
    /// when the import is aborted.
    pub async fn import_file(
        &self,
        cache: &Path,
        resume: bool,
    ) -> Result<ImportSummary, ImportError> {
        let records = read_cache(cache)?;
        let checkpoint = Checkpoint::for_cache(cache);

        let start = if resume { checkpoint.load()? } else { 0 };
        if start > records.len() {
            warn!(
                checkpoint = start,
                records = records.len(),
                "Checkpoint is past the end of the cache file, nothing to resume"
            );
        } else if start > 0 {
            info!(skipped = start, "Resuming import from checkpoint");
        }

        info!(
            cache = %cache.display(),
            records = records.len(),
            project_key = %self.project_key,
            "Importing issues into Jira"
        );

        let summary = self.import_from(&records, start, Some(&checkpoint)).await?;
        checkpoint.clear()?;
        Ok(summary)
    }

    /// Imports `records` without checkpointing.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Aborted`] on authentication errors or
    /// exhausted retries.
    pub async fn import_records(
        &self,
        records: &[IssueRecord],
    ) -> Result<ImportSummary, ImportError> {
        self.import_from(records, 0, None).await
    }

    async fn import_from(
        &self,
        records: &[IssueRecord],
        start: usize,
        checkpoint: Option<&Checkpoint>,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary {
            resumed_from: start.min(records.len()),
            ..ImportSummary::default()
        };

        for (index, record) in records.iter().enumerate().skip(start) {
            let span = info_span!("import_record", source_id = record.id);
            let outcome = match self.import_one(record).instrument(span).await {
                Ok(outcome) => outcome,
                Err(abort) => {
                    // An issue created before the abort still counts, so
                    // resuming does not create it twice.
                    if let Some(outcome) = abort.created {
                        summary.record(outcome);
                        if let Some(checkpoint) = checkpoint {
                            checkpoint.save(index + 1)?;
                        }
                    }
                    error!(
                        source_id = record.id,
                        processed = summary.processed(),
                        error = %abort.source,
                        "Aborting import"
                    );
                    return Err(ImportError::Aborted {
                        source_id: record.id,
                        processed: summary.processed(),
                        source: abort.source,
                    });
                }
            };

            summary.record(outcome);
            if let Some(checkpoint) = checkpoint {
                checkpoint.save(index + 1)?;
            }
        }

        info!(
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "Import complete"
        );
        Ok(summary)
    }

    /// Imports a single record. Only fatal API errors are returned as `Err`.
    async fn import_one(&self, record: &IssueRecord) -> Result<RecordOutcome, Abort> {
        let mut payload = match build_payload(
            record,
            self.mapping,
            &self.project_key,
            self.start_date_field.as_deref(),
        ) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Skipping record");
                return Ok(RecordOutcome::Skipped {
                    source_id: record.id,
                    reason: e.to_string(),
                });
            }
        };

        if self.map_users {
            let fields = &mut payload.request.fields;
            fields.reporter = self.resolve_user(record.author.as_deref(), "reporter").await?;
            fields.assignee = self.resolve_user(record.assignee.as_deref(), "assignee").await?;
        }

        debug!(
            summary = %payload.request.fields.summary,
            issue_type = %payload.request.fields.issue_type.name,
            priority = %payload.request.fields.priority.name,
            status = %payload.target_status,
            "Creating issue"
        );

        let created = match self
            .limiter
            .execute("create Jira issue", || self.client.create_issue(&payload.request))
            .await
        {
            Ok(created) => created,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                error!(error = %e, "Failed to create issue");
                return Ok(RecordOutcome::Failed {
                    source_id: record.id,
                    error: e.to_string(),
                });
            }
        };

        let key = created.key;
        info!(key = %key, "Created issue");

        if !payload
            .target_status
            .eq_ignore_ascii_case(&self.initial_status)
        {
            match self.transition(&key, &payload.target_status).await {
                Ok(()) => {}
                Err(source) if source.is_fatal() => {
                    return Err(Abort {
                        created: Some(RecordOutcome::Created {
                            source_id: record.id,
                            key,
                        }),
                        source,
                    });
                }
                Err(e) => warn!(
                    key = %key,
                    status = %payload.target_status,
                    error = %e,
                    "Failed to transition issue"
                ),
            }
        }

        Ok(RecordOutcome::Created {
            source_id: record.id,
            key,
        })
    }

    /// Moves `key` to `status` using whichever transition leads there.
    async fn transition(&self, key: &str, status: &str) -> Result<(), ApiError> {
        let transitions = self
            .limiter
            .execute("list Jira transitions", || self.client.transitions(key))
            .await?;

        let Some(transition) = transitions.iter().find(|t| {
            t.to.name.eq_ignore_ascii_case(status) || t.name.eq_ignore_ascii_case(status)
        }) else {
            warn!(
                key,
                status,
                available = ?transitions.iter().map(|t| t.to.name.as_str()).collect::<Vec<_>>(),
                "No transition leads to status"
            );
            return Ok(());
        };

        self.limiter
            .execute("transition Jira issue", || {
                self.client.transition_issue(key, &transition.id)
            })
            .await?;

        debug!(key, status, transition = %transition.name, "Transitioned issue");
        Ok(())
    }

    /// Finds the Jira account for a Redmine user name.
    ///
    /// Prefers an exact display-name match over the first search hit.
    /// Results, misses included, are remembered for the rest of the import.
    /// Only fatal errors are returned; anything else leaves the field unset.
    async fn resolve_user(
        &self,
        name: Option<&str>,
        role: &str,
    ) -> Result<Option<AccountRef>, ApiError> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if let Some(cached) = self.users.lock().await.get(name) {
            return Ok(cached.clone().map(|account_id| AccountRef { account_id }));
        }

        let users = match self
            .limiter
            .execute("search Jira users", || self.client.search_users(name))
            .await
        {
            Ok(users) => users,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(role, name, error = %e, "User lookup failed");
                return Ok(None);
            }
        };

        let account_id = users
            .iter()
            .find(|user| user.display_name.eq_ignore_ascii_case(name))
            .or_else(|| users.first())
            .map(|user| user.account_id.clone());
        if account_id.is_none() {
            warn!(role, name, "No Jira user matches");
        }

        self.users
            .lock()
            .await
            .insert(name.to_string(), account_id.clone());
        Ok(account_id.map(|account_id| AccountRef { account_id }))
    }
}
