//! Runner error types.

/// Errors that can occur while running a migration.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The mapping table is incomplete or has invalid overrides.
    #[error("Invalid mapping table: {0}")]
    Mapping(#[from] crate::mapping::MappingError),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The Jira REST root could not be derived from the site URL.
    #[error("Invalid Jira URL: {0}")]
    JiraUrl(#[from] url::ParseError),

    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] crate::extract::ExtractError),

    /// Import failed.
    #[error(transparent)]
    Import(#[from] crate::import::ImportError),
}
