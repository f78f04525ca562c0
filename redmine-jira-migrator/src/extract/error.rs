//! Extraction error types.

use crate::cache::CacheError;
use crate::client::ApiError;
use thiserror::Error;

/// Errors that abort an extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A page could not be fetched. Records from earlier pages were written
    /// to the cache file before this error was returned.
    #[error("Extraction failed on page {page} (offset {offset}), {preserved} records kept: {source}")]
    Page {
        page: u32,
        offset: u64,
        preserved: usize,
        #[source]
        source: ApiError,
    },

    /// The cache file could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
