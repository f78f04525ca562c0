//! Per-record import outcomes.

/// Result of importing a single Issue Record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A Jira issue was created.
    Created {
        /// Redmine issue id.
        source_id: u64,
        /// Key of the new Jira issue.
        key: String,
    },

    /// The record could not be mapped and was left out.
    Skipped {
        /// Redmine issue id.
        source_id: u64,
        /// Reason for skipping.
        reason: String,
    },

    /// Jira refused or mangled the creation call.
    Failed {
        /// Redmine issue id.
        source_id: u64,
        /// Error message.
        error: String,
    },
}

impl RecordOutcome {
    /// Returns the Redmine id of the record this outcome is about.
    #[must_use]
    pub fn source_id(&self) -> u64 {
        match self {
            Self::Created { source_id, .. }
            | Self::Skipped { source_id, .. }
            | Self::Failed { source_id, .. } => *source_id,
        }
    }
}
