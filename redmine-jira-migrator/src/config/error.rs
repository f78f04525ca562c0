//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse settings in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Validation error in settings.
    #[error("Validation error in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// A credential needed by the selected run mode is not set.
    #[error("{key} is required for this run (set it in the settings file or {env})")]
    MissingCredential {
        key: &'static str,
        env: &'static str,
    },

    /// Missing required file.
    #[error("Missing required file: {path}")]
    MissingFile { path: String },
}
