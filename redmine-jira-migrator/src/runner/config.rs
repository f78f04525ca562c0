//! Runner configuration.

use crate::filter::FilterCriteria;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which phases a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write the cache file and stop.
    ExtractOnly,
    /// Import an existing cache file.
    ImportOnly,
    /// Extract, then import the file just written.
    Combined,
}

impl RunMode {
    /// Returns true if the run starts with extraction.
    #[must_use]
    pub fn extracts(self) -> bool {
        matches!(self, Self::ExtractOnly | Self::Combined)
    }

    /// Returns true if the run imports into Jira.
    #[must_use]
    pub fn imports(self) -> bool {
        matches!(self, Self::ImportOnly | Self::Combined)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExtractOnly => "extract-only",
            Self::ImportOnly => "import-only",
            Self::Combined => "combined",
        })
    }
}

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Phases to execute.
    mode: RunMode,
    /// Which Redmine issues to migrate.
    criteria: FilterCriteria,
    /// JSON cache file written by extraction and read by import.
    cache_file: PathBuf,
    /// Whether to continue from the import checkpoint.
    resume: bool,
}

impl RunnerConfig {
    /// Creates a configuration using the default cache file name for
    /// `criteria`.
    pub fn new(mode: RunMode, criteria: FilterCriteria) -> Self {
        let cache_file = criteria.default_cache_file();
        Self {
            mode,
            criteria,
            cache_file,
            resume: false,
        }
    }

    /// Sets a custom cache file path.
    #[must_use]
    pub fn with_cache_file(mut self, cache_file: PathBuf) -> Self {
        self.cache_file = cache_file;
        self
    }

    /// Enables or disables resuming from the import checkpoint.
    #[must_use]
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Returns the run mode.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Returns the filter criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Returns the cache file path.
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Returns whether the import resumes from its checkpoint.
    pub fn resume(&self) -> bool {
        self.resume
    }
}
