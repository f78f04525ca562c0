//! Import error types.

use crate::cache::CacheError;
use crate::client::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an import before every record was processed.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The cache file could not be read.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The checkpoint file could not be read or written.
    #[error("Checkpoint I/O error at {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file does not hold a record count.
    #[error("Checkpoint at {path} is not a record count: {content:?}")]
    InvalidCheckpoint { path: PathBuf, content: String },

    /// Authentication failed or retries were exhausted while creating an
    /// issue.
    #[error("Import aborted at Redmine issue {source_id} after {processed} records: {source}")]
    Aborted {
        source_id: u64,
        processed: usize,
        #[source]
        source: ApiError,
    },
}
