//! Settings file schema.

use super::ConfigError;
use crate::runner::RunMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Environment variable overriding `redmine.api-key`.
pub const REDMINE_API_KEY_ENV: &str = "REDMINE_API_KEY";

/// Environment variable overriding `jira.email`.
pub const JIRA_EMAIL_ENV: &str = "JIRA_EMAIL";

/// Environment variable overriding `jira.api-token`.
pub const JIRA_API_TOKEN_ENV: &str = "JIRA_API_TOKEN";

/// Largest page Redmine serves from `issues.json`.
const MAX_PAGE_SIZE: u32 = 100;

/// Complete settings for a migration run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Source tracker.
    pub redmine: RedmineSettings,

    /// Destination tracker.
    pub jira: JiraSettings,

    /// Throttling and retry policy shared by both trackers.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Overrides for the built-in value mapping.
    #[serde(default)]
    pub mapping: MappingSettings,
}

/// `[redmine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RedmineSettings {
    /// Base URL of the Redmine instance.
    pub url: Url,

    /// REST API key.
    pub api_key: Option<String>,

    /// Issues requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// `[jira]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraSettings {
    /// Base URL of the Jira site (without `/rest/api/...`).
    pub url: Url,

    /// Account e-mail used for basic auth.
    pub email: Option<String>,

    /// API token used for basic auth.
    pub api_token: Option<String>,

    /// Destination project key; defaults to the `--project` argument.
    pub project_key: Option<String>,

    /// Issue type used when a tracker has no mapping.
    #[serde(default = "default_issue_type")]
    pub default_issue_type: String,

    /// Status Jira assigns to newly created issues.
    #[serde(default = "default_initial_status")]
    pub initial_status: String,

    /// Look up Redmine authors and assignees as Jira reporters and assignees.
    #[serde(default = "default_map_users")]
    pub map_users: bool,

    /// Custom field id receiving the Redmine start date
    /// (e.g. `customfield_10015`). Start dates are dropped when unset.
    #[serde(default)]
    pub start_date_field: Option<String>,
}

/// `[rate-limit]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitSettings {
    /// Minimum spacing between two API calls.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Retries after a rate-limited or transient failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff cap.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// `[mapping]` section; every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MappingSettings {
    /// Jira status name per Redmine status (name or code).
    #[serde(default)]
    pub status: BTreeMap<String, String>,

    /// Jira priority name per Redmine priority (name or code).
    #[serde(default)]
    pub priority: BTreeMap<String, String>,

    /// Jira issue type per Redmine tracker name.
    #[serde(default)]
    pub issue_type: BTreeMap<String, String>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    50
}

fn default_issue_type() -> String {
    "Task".to_string()
}

fn default_initial_status() -> String {
    "To Do".to_string()
}

fn default_map_users() -> bool {
    true
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Settings {
    /// Parses settings from TOML, applies environment overrides and validates.
    ///
    /// `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] or [`ConfigError::ValidationError`].
    pub fn parse(content: &str, path: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|e| ConfigError::TomlError {
                path: path.to_string(),
                source: e,
            })?;

        settings.apply_env();
        settings.validate(path)?;
        Ok(settings)
    }

    /// Checks that the credentials needed by the phases of `mode` are set.
    ///
    /// Extraction needs the Redmine API key, import needs the Jira email and
    /// API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] for the first missing value.
    pub fn check_credentials(&self, mode: RunMode) -> Result<(), ConfigError> {
        let mut required = Vec::new();
        if mode.extracts() {
            required.push(("redmine.api-key", REDMINE_API_KEY_ENV, &self.redmine.api_key));
        }
        if mode.imports() {
            required.push(("jira.email", JIRA_EMAIL_ENV, &self.jira.email));
            required.push(("jira.api-token", JIRA_API_TOKEN_ENV, &self.jira.api_token));
        }

        match required.into_iter().find(|(_, _, value)| is_blank(value)) {
            Some((key, env, _)) => Err(ConfigError::MissingCredential { key, env }),
            None => Ok(()),
        }
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Replaces credentials with values from the environment when set.
    fn apply_env(&mut self) {
        if let Some(key) = env_value(REDMINE_API_KEY_ENV) {
            self.redmine.api_key = Some(key);
        }
        if let Some(email) = env_value(JIRA_EMAIL_ENV) {
            self.jira.email = Some(email);
        }
        if let Some(token) = env_value(JIRA_API_TOKEN_ENV) {
            self.jira.api_token = Some(token);
        }
    }

    fn validate(&self, path: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.to_string(),
            message,
        };

        for (name, url) in [("redmine.url", &self.redmine.url), ("jira.url", &self.jira.url)] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(format!("{name} must be an http(s) URL: {url}")));
            }
        }

        if self.redmine.page_size == 0 || self.redmine.page_size > MAX_PAGE_SIZE {
            return Err(invalid(format!(
                "redmine.page-size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        if self.rate_limit.max_backoff_ms < self.rate_limit.initial_backoff_ms {
            return Err(invalid(
                "rate-limit.max-backoff-ms must not be below initial-backoff-ms".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(invalid("request-timeout-secs must be positive".to_string()));
        }

        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDENTIAL_VARS: [&str; 3] = [REDMINE_API_KEY_ENV, JIRA_EMAIL_ENV, JIRA_API_TOKEN_ENV];

    const FULL: &str = r#"
request-timeout-secs = 10

[redmine]
url = "https://redmine.example.com/"
api-key = "redmine-key"
page-size = 25

[jira]
url = "https://example.atlassian.net"
email = "me@example.com"
api-token = "jira-token"
project-key = "MIG"
default-issue-type = "Story"
map-users = false
start-date-field = "customfield_10015"

[rate-limit]
min-interval-ms = 250
max-retries = 3
initial-backoff-ms = 500
max-backoff-ms = 4000

[mapping.status]
feedback = "Waiting"

[mapping.priority]
low = "Low"
immediate = "Blocker"

[mapping.issue-type]
Support = "Service Request"
"#;

    fn parse(content: &str) -> Result<Settings, ConfigError> {
        temp_env::with_vars_unset(CREDENTIAL_VARS, || Settings::parse(content, "test.toml"))
    }

    #[test]
    fn parses_every_section() {
        let settings = parse(FULL).unwrap();

        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.redmine.page_size, 25);
        assert_eq!(settings.jira.project_key.as_deref(), Some("MIG"));
        assert_eq!(settings.jira.default_issue_type, "Story");
        assert_eq!(settings.jira.initial_status, "To Do");
        assert!(!settings.jira.map_users);
        assert_eq!(
            settings.jira.start_date_field.as_deref(),
            Some("customfield_10015")
        );
        assert_eq!(settings.rate_limit.min_interval_ms, 250);
        assert_eq!(settings.rate_limit.max_retries, 3);
        assert_eq!(
            settings.mapping.status.get("feedback"),
            Some(&"Waiting".to_string())
        );
        assert_eq!(
            settings.mapping.priority.get("immediate"),
            Some(&"Blocker".to_string())
        );
        assert_eq!(
            settings.mapping.issue_type.get("Support"),
            Some(&"Service Request".to_string())
        );
    }

    #[test]
    fn applies_defaults() {
        let settings = parse(
            r#"
[redmine]
url = "http://localhost:3000"
api-key = "k"

[jira]
url = "https://example.atlassian.net"
email = "e"
api-token = "t"
"#,
        )
        .unwrap();

        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.redmine.page_size, 50);
        assert_eq!(settings.rate_limit.max_retries, 5);
        assert_eq!(settings.rate_limit.max_backoff_ms, 60_000);
        assert!(settings.mapping.status.is_empty());
        assert!(settings.jira.map_users);
        assert!(settings.jira.start_date_field.is_none());
    }

    #[test]
    fn environment_overrides_credentials() {
        let content = r#"
[redmine]
url = "http://localhost:3000"

[jira]
url = "https://example.atlassian.net"
email = "file@example.com"
"#;

        let settings = temp_env::with_vars(
            [
                (REDMINE_API_KEY_ENV, Some("env-key")),
                (JIRA_EMAIL_ENV, Some("env@example.com")),
                (JIRA_API_TOKEN_ENV, Some("env-token")),
            ],
            || Settings::parse(content, "test.toml"),
        )
        .unwrap();

        assert_eq!(settings.redmine.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.jira.email.as_deref(), Some("env@example.com"));
        assert_eq!(settings.jira.api_token.as_deref(), Some("env-token"));
    }

    const REDMINE_ONLY: &str = r#"
[redmine]
url = "http://localhost:3000"
api-key = "k"

[jira]
url = "https://example.atlassian.net"
"#;

    const JIRA_ONLY: &str = r#"
[redmine]
url = "http://localhost:3000"

[jira]
url = "https://example.atlassian.net"
email = "e"
api-token = "t"
"#;

    #[test]
    fn credentials_are_optional_when_parsing() {
        assert!(parse(REDMINE_ONLY).is_ok());
        assert!(parse(JIRA_ONLY).is_ok());
    }

    #[test]
    fn extraction_needs_only_redmine_key() {
        let settings = parse(REDMINE_ONLY).unwrap();

        settings.check_credentials(RunMode::ExtractOnly).unwrap();
        assert!(matches!(
            settings.check_credentials(RunMode::Combined),
            Err(ConfigError::MissingCredential { key: "jira.email", .. })
        ));
    }

    #[test]
    fn import_needs_only_jira_credentials() {
        let settings = parse(JIRA_ONLY).unwrap();

        settings.check_credentials(RunMode::ImportOnly).unwrap();
        match settings.check_credentials(RunMode::ExtractOnly) {
            Err(ConfigError::MissingCredential { key, env }) => {
                assert_eq!(key, "redmine.api-key");
                assert_eq!(env, REDMINE_API_KEY_ENV);
            }
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let content = JIRA_ONLY.replace("api-token = \"t\"", "api-token = \"  \"");
        let settings = parse(&content).unwrap();

        assert!(matches!(
            settings.check_credentials(RunMode::ImportOnly),
            Err(ConfigError::MissingCredential { key: "jira.api-token", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        let content = FULL.replace("page-size = 25", "page-size = 500");
        assert!(matches!(
            parse(&content),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn rejects_non_http_urls() {
        let content = FULL.replace(
            "https://redmine.example.com/",
            "ftp://redmine.example.com/",
        );
        assert!(matches!(
            parse(&content),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
