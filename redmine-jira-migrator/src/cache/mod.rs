//! JSON cache of extracted issue records.
//!
//! The cache is the hand-off between extraction and import: an ordered JSON
//! array of [`IssueRecord`]s. Writes go through a temporary file in the same
//! directory and are renamed into place, so a reader never observes a
//! half-written file.

mod error;

pub use error::CacheError;

use crate::issue::IssueRecord;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes records to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`CacheError`] if the file cannot be created or serialized.
pub fn write_cache(path: &Path, records: &[IssueRecord]) -> Result<(), CacheError> {
    let io_error = |source| CacheError::IoError {
        path: path.display().to_string(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(parent).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
            CacheError::JsonError {
                path: path.display().to_string(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)?;
    }
    temp.as_file().sync_all().map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;

    debug!(path = %path.display(), count = records.len(), "Wrote cache file");
    Ok(())
}

/// Reads records from `path` in file order.
///
/// # Errors
///
/// Returns [`CacheError::MissingFile`] if the file does not exist, or another
/// [`CacheError`] if it cannot be read or parsed.
pub fn read_cache(path: &Path) -> Result<Vec<IssueRecord>, CacheError> {
    let file = std::fs::File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CacheError::MissingFile {
                path: path.display().to_string(),
            }
        } else {
            CacheError::IoError {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    let records: Vec<IssueRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CacheError::JsonError {
            path: path.display().to_string(),
            source,
        })?;

    debug!(path = %path.display(), count = records.len(), "Read cache file");
    Ok(records)
}
