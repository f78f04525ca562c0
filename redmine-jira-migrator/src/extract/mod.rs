//! Redmine extraction.
//!
//! Pages through `issues.json`, converts every issue into an
//! [`IssueRecord`], keeps the ones matching the [`FilterCriteria`] and writes
//! them, in source order, to the JSON cache.

mod error;

pub use error::ExtractError;

use crate::cache::write_cache;
use crate::client::{ApiError, RedmineClient};
use crate::filter::FilterCriteria;
use crate::issue::IssueRecord;
use crate::rate_limit::RateLimiter;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument};

/// Outcome of a completed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// Pages requested, including the final empty one if any.
    pub pages: u32,

    /// Issues returned by Redmine before client-side filtering.
    pub fetched: usize,

    /// Records written to the cache.
    pub matched: usize,
}

/// A page that could not be fetched.
struct PageFailure {
    page: u32,
    offset: u64,
    source: ApiError,
}

/// Pulls issues from Redmine through the shared rate limiter.
pub struct Extractor<'a> {
    client: &'a RedmineClient,
    limiter: &'a RateLimiter,
    page_size: u32,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor requesting `page_size` issues per page.
    pub fn new(client: &'a RedmineClient, limiter: &'a RateLimiter, page_size: u32) -> Self {
        Self {
            client,
            limiter,
            page_size,
        }
    }

    /// Extracts every matching issue and writes them to `output`.
    ///
    /// The file is replaced on every run. When a page fails, the records
    /// gathered from earlier pages are still written before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Page`] when a page fails with a
    /// non-retryable error or exhausts its retries, and
    /// [`ExtractError::Cache`] when the file cannot be written.
    pub async fn extract_to_file(
        &self,
        criteria: &FilterCriteria,
        output: &Path,
    ) -> Result<ExtractReport, ExtractError> {
        let span = info_span!("extract", project = %criteria.project());
        self.extract_and_write(criteria, output)
            .instrument(span)
            .await
    }

    async fn extract_and_write(
        &self,
        criteria: &FilterCriteria,
        output: &Path,
    ) -> Result<ExtractReport, ExtractError> {
        info!(output = %output.display(), "Extracting Redmine issues");

        let mut records = Vec::new();
        match self.fetch_into(criteria, &mut records).await {
            Ok((pages, fetched)) => {
                write_cache(output, &records)?;
                info!(pages, fetched, matched = records.len(), "Extraction complete");
                Ok(ExtractReport {
                    pages,
                    fetched,
                    matched: records.len(),
                })
            }
            Err(failure) => {
                warn!(
                    page = failure.page,
                    offset = failure.offset,
                    preserved = records.len(),
                    error = %failure.source,
                    "Extraction aborted, keeping partial results"
                );
                write_cache(output, &records)?;
                Err(ExtractError::Page {
                    page: failure.page,
                    offset: failure.offset,
                    preserved: records.len(),
                    source: failure.source,
                })
            }
        }
    }

    /// Fetches pages until Redmine reports no further results.
    ///
    /// Returns the number of pages and of issues received.
    async fn fetch_into(
        &self,
        criteria: &FilterCriteria,
        records: &mut Vec<IssueRecord>,
    ) -> Result<(u32, usize), PageFailure> {
        let params = criteria.query_params();
        let mut offset = 0u64;
        let mut page = 0u32;
        let mut fetched = 0usize;

        loop {
            page += 1;
            let batch = self
                .limiter
                .execute("list Redmine issues", || {
                    self.client.list_issues(&params, offset, self.page_size)
                })
                .await
                .map_err(|source| PageFailure {
                    page,
                    offset,
                    source,
                })?;

            let received = batch.issues.len();
            fetched += received;

            let before = records.len();
            for issue in batch.issues {
                let record = issue.into_record(criteria.project());
                let keep = criteria.matches(&record);
                debug!(
                    id = record.id,
                    status = record.status,
                    priority = record.priority,
                    keep,
                    "Fetched issue"
                );
                if keep {
                    records.push(record);
                }
            }

            info!(
                page,
                offset,
                received,
                kept = records.len() - before,
                total = ?batch.total_count,
                "Fetched page"
            );

            if received == 0 {
                break;
            }
            offset += received as u64;
            if batch.total_count.is_some_and(|total| offset >= total) {
                break;
            }
        }

        Ok((page, fetched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::read_cache;
    use crate::issue::IssueStatus;
    use crate::rate_limit::RetryPolicy;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue(id: u64, status: u64) -> Value {
        json!({
            "id": id,
            "project": {"id": 1, "name": "Demo"},
            "status": {"id": status, "name": "whatever"},
            "priority": {"id": 2, "name": "Normal"},
            "subject": format!("Issue {id}"),
            "description": "",
            "created_on": "2023-06-30T10:00:00Z",
            "updated_on": "2023-06-30T10:00:00Z"
        })
    }

    fn page(issues: Vec<Value>, total: u64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "issues": issues,
            "total_count": total,
        }))
    }

    fn limiter() -> RateLimiter {
        RateLimiter::new(
            Duration::ZERO,
            RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
            },
        )
    }

    fn client(server: &MockServer) -> RedmineClient {
        RedmineClient::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
            "key",
        )
    }

    #[tokio::test]
    async fn stops_on_empty_page_without_total() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/issues.json"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [issue(1, 1), issue(2, 5)]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/issues.json"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issues": []})))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.json");
        let client = client(&server);
        let limiter = limiter();
        let extractor = Extractor::new(&client, &limiter, 2);

        let report = extractor
            .extract_to_file(&FilterCriteria::new("demo", [], []), &output)
            .await
            .unwrap();

        assert_eq!(
            report,
            ExtractReport {
                pages: 2,
                fetched: 2,
                matched: 2
            }
        );
        assert_eq!(read_cache(&output).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_page_keeps_earlier_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("offset", "0"))
            .respond_with(page(vec![issue(1, 5), issue(2, 1)], 4))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.json");
        let client = client(&server);
        let limiter = limiter();
        let extractor = Extractor::new(&client, &limiter, 2);

        let result = extractor
            .extract_to_file(
                &FilterCriteria::new("demo", [IssueStatus::Closed], []),
                &output,
            )
            .await;

        match result {
            Err(ExtractError::Page {
                page,
                offset,
                preserved,
                source,
            }) => {
                assert_eq!(page, 2);
                assert_eq!(offset, 2);
                assert_eq!(preserved, 1);
                assert!(matches!(source, ApiError::Auth { status: 403, .. }));
            }
            other => panic!("expected page failure, got {other:?}"),
        }

        let kept = read_cache(&output).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[tokio::test]
    async fn transient_page_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(page(vec![issue(1, 1)], 1))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.json");
        let client = client(&server);
        let limiter = limiter();
        let extractor = Extractor::new(&client, &limiter, 50);

        let report = extractor
            .extract_to_file(&FilterCriteria::new("demo", [], []), &output)
            .await
            .unwrap();

        assert_eq!(report.matched, 1);
        assert_eq!(limiter.stats().await.backoffs, 1);
    }

    #[tokio::test]
    async fn persistent_unavailability_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.json");
        let client = client(&server);
        let limiter = limiter();
        let extractor = Extractor::new(&client, &limiter, 50);

        let result = extractor
            .extract_to_file(&FilterCriteria::new("demo", [], []), &output)
            .await;

        match result {
            Err(ExtractError::Page {
                page,
                preserved,
                source,
                ..
            }) => {
                assert_eq!(page, 1);
                assert_eq!(preserved, 0);
                assert!(source.is_fatal());
                assert!(matches!(source, ApiError::RetriesExhausted { attempts: 3, .. }));
            }
            other => panic!("expected page failure, got {other:?}"),
        }
        assert!(read_cache(&output).unwrap().is_empty());
        let stats = limiter.stats().await;
        assert_eq!((stats.backoffs, stats.exhausted), (2, 1));
    }
}
