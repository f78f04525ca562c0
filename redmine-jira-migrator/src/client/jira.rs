//! Jira REST (v2) client.

use super::{check_status, decode_json, endpoint, network_error, ApiError};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Request body for `POST /rest/api/2/issue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIssueRequest {
    pub fields: IssueFields,
}

/// Fields set on a newly created issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueFields {
    pub project: ProjectKey,
    pub summary: String,
    pub description: String,
    #[serde(rename = "issuetype")]
    pub issue_type: Named,
    pub priority: Named,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<AccountRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<AccountRef>,
    #[serde(rename = "duedate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Custom field values keyed by field id (`customfield_10015`).
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

/// Reference to a Jira user by account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRef {
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// A user returned by `GET /rest/api/2/user/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectKey {
    pub key: String,
}

/// Reference by display name (`{"name": "Bug"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

/// Response of a successful issue creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to: Named,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
struct TransitionRequest<'a> {
    transition: TransitionId<'a>,
}

#[derive(Debug, Serialize)]
struct TransitionId<'a> {
    id: &'a str,
}

/// Client for the Jira issue endpoints, authenticated with basic auth.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    api_url: Url,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Creates a client for the Jira site at `site_url`.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] if the REST root cannot be derived.
    pub fn new(
        http: Client,
        site_url: &Url,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let api_url = Url::parse(&endpoint(site_url, "rest/api/2"))?;
        Ok(Self {
            http,
            api_url,
            email: email.into(),
            api_token: api_token.into(),
        })
    }

    /// Creates an issue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failures, non-success statuses or an
    /// undecodable body.
    pub async fn create_issue(
        &self,
        request: &CreateIssueRequest,
    ) -> Result<CreatedIssue, ApiError> {
        let url = endpoint(&self.api_url, "issue");
        debug!(url = %url, summary = %request.fields.summary, "Creating Jira issue");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .json(request)
            .send()
            .await
            .map_err(network_error(&url))?;

        let response = check_status(&url, response).await?;
        decode_json(&url, response).await
    }

    /// Searches users by name or email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn search_users(&self, query: &str) -> Result<Vec<JiraUser>, ApiError> {
        let url = endpoint(&self.api_url, "user/search");
        debug!(url = %url, query, "Searching Jira users");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&[("query", query)])
            .send()
            .await
            .map_err(network_error(&url))?;

        let response = check_status(&url, response).await?;
        decode_json(&url, response).await
    }

    /// Lists the transitions currently available on an issue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn transitions(&self, key: &str) -> Result<Vec<Transition>, ApiError> {
        let url = endpoint(&self.api_url, &format!("issue/{key}/transitions"));

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .send()
            .await
            .map_err(network_error(&url))?;

        let response = check_status(&url, response).await?;
        let body: TransitionsResponse = decode_json(&url, response).await?;
        Ok(body.transitions)
    }

    /// Applies a transition to an issue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<(), ApiError> {
        let url = endpoint(&self.api_url, &format!("issue/{key}/transitions"));
        debug!(key, transition_id, "Transitioning Jira issue");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .json(&TransitionRequest {
                transition: TransitionId { id: transition_id },
            })
            .send()
            .await
            .map_err(network_error(&url))?;

        check_status(&url, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CreateIssueRequest {
        CreateIssueRequest {
            fields: IssueFields {
                project: ProjectKey {
                    key: "DEMO".to_string(),
                },
                summary: "Crash".to_string(),
                description: "Stack trace".to_string(),
                issue_type: Named {
                    name: "Bug".to_string(),
                },
                priority: Named {
                    name: "High".to_string(),
                },
                labels: Vec::new(),
                reporter: None,
                assignee: None,
                due_date: None,
                custom: BTreeMap::new(),
            },
        }
    }

    async fn client(server: &MockServer) -> JiraClient {
        JiraClient::new(
            Client::new(),
            &Url::parse(&server.uri()).unwrap(),
            "me@example.com",
            "token",
        )
        .unwrap()
    }

    #[test]
    fn serializes_create_payload() {
        let value = serde_json::to_value(request()).unwrap();

        assert_eq!(
            value,
            json!({
                "fields": {
                    "project": {"key": "DEMO"},
                    "summary": "Crash",
                    "description": "Stack trace",
                    "issuetype": {"name": "Bug"},
                    "priority": {"name": "High"}
                }
            })
        );
    }

    #[test]
    fn serializes_people_dates_and_custom_fields() {
        let mut request = request();
        request.fields.reporter = Some(AccountRef {
            account_id: "acc-1".to_string(),
        });
        request.fields.due_date = NaiveDate::from_ymd_opt(2023, 7, 14);
        request
            .fields
            .custom
            .insert("customfield_10015".to_string(), "2023-07-03".to_string());

        let value = serde_json::to_value(request).unwrap();

        assert_eq!(value["fields"]["reporter"], json!({"accountId": "acc-1"}));
        assert_eq!(value["fields"]["duedate"], "2023-07-14");
        assert_eq!(value["fields"]["customfield_10015"], "2023-07-03");
        assert!(value["fields"].get("assignee").is_none());
    }

    #[tokio::test]
    async fn searches_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/user/search"))
            .and(query_param("query", "Ada Lovelace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"accountId": "acc-1", "displayName": "Ada Lovelace", "active": true}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let users = client(&server).await.search_users("Ada Lovelace").await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].account_id, "acc-1");
        assert_eq!(users[0].display_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn creates_issue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue"))
            .and(header_exists("authorization"))
            .and(body_json(serde_json::to_value(request()).unwrap()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "10001",
                "key": "DEMO-1",
                "self": "https://jira/rest/api/2/issue/10001"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server).await.create_issue(&request()).await.unwrap();

        assert_eq!(created.key, "DEMO-1");
        assert_eq!(created.id, "10001");
    }

    #[tokio::test]
    async fn validation_errors_are_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"errors": {"priority": "invalid"}})),
            )
            .mount(&server)
            .await;

        let result = client(&server).await.create_issue(&request()).await;

        match result {
            Err(ApiError::Rejected { status, body, .. }) => {
                assert_eq!(status, 400);
                assert!(body.contains("priority"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let result = client(&server).await.create_issue(&request()).await;

        match result {
            Err(ApiError::RateLimited { retry_after, .. }) => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(7)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lists_and_applies_transitions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/DEMO-1/transitions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transitions": [
                    {"id": "21", "name": "Start", "to": {"name": "In Progress"}},
                    {"id": "31", "name": "Finish", "to": {"name": "Done"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/DEMO-1/transitions"))
            .and(body_json(json!({"transition": {"id": "31"}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let transitions = client.transitions("DEMO-1").await.unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[1].to.name, "Done");

        client.transition_issue("DEMO-1", "31").await.unwrap();
    }
}
