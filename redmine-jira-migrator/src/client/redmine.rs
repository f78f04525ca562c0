//! Redmine REST client.

use super::{check_status, decode_json, endpoint, network_error, ApiError};
use crate::issue::IssueRecord;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Client for Redmine's `issues.json` endpoint.
#[derive(Debug, Clone)]
pub struct RedmineClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

/// One page of `GET /issues.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuePage {
    pub issues: Vec<RedmineIssue>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// An issue as Redmine serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RedmineIssue {
    pub id: u64,
    pub project: NamedRef,
    #[serde(default)]
    pub tracker: Option<NamedRef>,
    pub status: NamedRef,
    pub priority: NamedRef,
    #[serde(default)]
    pub category: Option<NamedRef>,
    #[serde(default)]
    pub author: Option<NamedRef>,
    #[serde(default)]
    pub assigned_to: Option<NamedRef>,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<RedmineAttachment>,
}

/// `{ "id": .., "name": .. }` reference used throughout the Redmine API.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedmineAttachment {
    pub filename: String,
    #[serde(default)]
    pub content_url: Option<String>,
}

impl RedmineIssue {
    /// Normalizes the issue into a record for `project`.
    pub fn into_record(self, project: &str) -> IssueRecord {
        IssueRecord {
            id: self.id,
            project: project.to_string(),
            subject: self.subject,
            description: self.description.unwrap_or_default(),
            status: code(self.status.id),
            priority: code(self.priority.id),
            created_at: self.created_on,
            updated_at: self.updated_on,
            tracker: self.tracker.map(|t| t.name).filter(|n| !n.is_empty()),
            category: self.category.map(|c| c.name).filter(|n| !n.is_empty()),
            author: self.author.map(|u| u.name).filter(|n| !n.is_empty()),
            assignee: self.assigned_to.map(|u| u.name).filter(|n| !n.is_empty()),
            start_date: self.start_date,
            due_date: self.due_date,
            attachments: self
                .attachments
                .into_iter()
                .map(|a| a.content_url.unwrap_or(a.filename))
                .collect(),
            comments: Vec::new(),
        }
    }
}

/// Saturates ids that do not fit a taxonomy code; those never map anyway.
fn code(id: u64) -> u32 {
    u32::try_from(id).unwrap_or(u32::MAX)
}

impl RedmineClient {
    /// Creates a client for the Redmine instance at `base_url`.
    pub fn new(http: Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Fetches one page of issues.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failures, non-success statuses or an
    /// undecodable body.
    pub async fn list_issues(
        &self,
        params: &[(&str, String)],
        offset: u64,
        limit: u32,
    ) -> Result<IssuePage, ApiError> {
        let url = endpoint(&self.base_url, "issues.json");
        debug!(url = %url, offset, limit, "Fetching Redmine issues page");

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(params)
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(network_error(&url))?;

        let response = check_status(&url, response).await?;
        decode_json(&url, response).await
    }
}
