//! Run summary types.

use super::outcome::RecordOutcome;

/// Counts produced by one import pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of Jira issues created.
    pub created: usize,

    /// Number of records skipped because of mapping errors.
    pub skipped: usize,

    /// Number of records whose creation call failed.
    pub failed: usize,

    /// Records passed over because a previous run had already processed them.
    pub resumed_from: usize,

    /// Outcome of every processed record, in cache order.
    pub outcomes: Vec<RecordOutcome>,
}

impl ImportSummary {
    /// Updates the counts with a record outcome and keeps the outcome.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match &outcome {
            RecordOutcome::Created { .. } => self.created += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Number of records processed in this pass.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of records written by the extraction phase.
    pub extracted: Option<usize>,

    /// Number of Jira issues created.
    pub created: usize,

    /// Number of records skipped.
    pub skipped: usize,

    /// Number of records that failed to import.
    pub failed: usize,

    /// Backoff delays taken by the rate limiter.
    pub backoffs: u64,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the counts of an import pass.
    pub fn record_import(&mut self, import: &ImportSummary) {
        self.created += import.created;
        self.skipped += import.skipped;
        self.failed += import.failed;
    }

    /// Returns true if any record failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if every processed record was created.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}
