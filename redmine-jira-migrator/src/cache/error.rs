//! Cache file error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the JSON cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file does not exist.
    #[error("Cache file not found: {path}")]
    MissingFile { path: String },

    /// Failed to read or write the file.
    #[error("Failed to access cache file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of issue records.
    #[error("Invalid cache file '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
