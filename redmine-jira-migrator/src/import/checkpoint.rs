//! Import progress checkpoint.
//!
//! The checkpoint sits next to the cache file as `<cache>.progress` and holds
//! the number of leading records already processed.

use super::error::ImportError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = ".progress";

/// Progress marker for one cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    /// Returns the checkpoint belonging to `cache`.
    #[must_use]
    pub fn for_cache(cache: &Path) -> Self {
        let mut path = cache.as_os_str().to_owned();
        path.push(EXTENSION);
        Self {
            path: PathBuf::from(path),
        }
    }

    /// Returns the checkpoint file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the processed count. A missing file counts as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Checkpoint`] on I/O errors and
    /// [`ImportError::InvalidCheckpoint`] when the content is not a number.
    pub fn load(&self) -> Result<usize, ImportError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(ImportError::Checkpoint {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        content
            .trim()
            .parse()
            .map_err(|_| ImportError::InvalidCheckpoint {
                path: self.path.clone(),
                content,
            })
    }

    /// Stores the processed count.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Checkpoint`] if the file cannot be written.
    pub fn save(&self, processed: usize) -> Result<(), ImportError> {
        fs::write(&self.path, format!("{processed}\n")).map_err(|source| {
            ImportError::Checkpoint {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Removes the checkpoint. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Checkpoint`] if the file exists but cannot be
    /// removed.
    pub fn clear(&self) -> Result<(), ImportError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ImportError::Checkpoint {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
