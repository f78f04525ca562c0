//! Settings file loading.
//!
//! Settings live in a TOML file (`migrator.toml` by default):
//!
//! ```toml
//! request-timeout-secs = 30
//!
//! [redmine]
//! url = "https://redmine.example.com"
//! api-key = "..."            # or REDMINE_API_KEY
//! page-size = 50
//!
//! [jira]
//! url = "https://example.atlassian.net"
//! email = "me@example.com"   # or JIRA_EMAIL
//! api-token = "..."          # or JIRA_API_TOKEN
//! project-key = "DEMO"       # defaults to --project
//! map-users = true           # author/assignee lookup
//! start-date-field = "customfield_10015"
//!
//! [rate-limit]
//! min-interval-ms = 1000
//! max-retries = 5
//!
//! [mapping.priority]
//! low = "Low"
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    JiraSettings, MappingSettings, RateLimitSettings, RedmineSettings, Settings,
    JIRA_API_TOKEN_ENV, JIRA_EMAIL_ENV, REDMINE_API_KEY_ENV,
};

use std::path::Path;
use tracing::{debug, info};

/// Loads, applies environment overrides to, and validates a settings file.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] if the file does not exist, or another
/// [`ConfigError`] if it cannot be read, parsed or validated.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    info!(path = %path.display(), "Loading settings");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::MissingFile {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::IoError {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;

    let settings = Settings::parse(&content, &path.display().to_string())?;
    debug!(
        redmine = %settings.redmine.url,
        jira = %settings.jira.url,
        "Loaded settings"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"
[redmine]
url = "https://redmine.example.com"
api-key = "redmine-key"

[jira]
url = "https://example.atlassian.net"
email = "me@example.com"
api-token = "jira-token"
"#;

    #[test]
    fn can_load_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("migrator.toml");
        fs::write(&path, VALID).unwrap();

        let settings = temp_env::with_vars_unset(
            [REDMINE_API_KEY_ENV, JIRA_EMAIL_ENV, JIRA_API_TOKEN_ENV],
            || load_settings(&path),
        )
        .unwrap();

        assert_eq!(settings.redmine.api_key.as_deref(), Some("redmine-key"));
        assert_eq!(settings.redmine.page_size, 50);
    }

    #[test]
    fn missing_settings_file() {
        let temp = TempDir::new().unwrap();
        let result = load_settings(&temp.path().join("missing.toml"));

        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
