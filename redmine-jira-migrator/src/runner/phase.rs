//! Run phases.

use super::config::RunMode;
use std::fmt;

/// Where a run is in the extract → import sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Extracting,
    Importing,
    Done,
    Failed,
}

impl Phase {
    /// Returns the phase following `self` for `mode`, or `None` once the run
    /// has ended.
    #[must_use]
    pub fn next(self, mode: RunMode) -> Option<Self> {
        match self {
            Self::Idle if mode.extracts() => Some(Self::Extracting),
            Self::Idle => Some(Self::Importing),
            Self::Extracting if mode.imports() => Some(Self::Importing),
            Self::Extracting | Self::Importing => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Importing => "importing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}
