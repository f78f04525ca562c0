//! Orchestrates extraction and import.

mod config;
mod error;
mod phase;

pub use config::{RunMode, RunnerConfig};
pub use error::RunnerError;
pub use phase::Phase;

use crate::client::{build_http_client, JiraClient, RedmineClient};
use crate::config::Settings;
use crate::extract::Extractor;
use crate::import::Importer;
use crate::mapping::MappingTable;
use crate::rate_limit::RateLimiter;
use crate::summary::RunSummary;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Runs the requested phases against one Redmine and one Jira instance.
pub struct Runner {
    config: RunnerConfig,
    redmine: RedmineClient,
    jira: JiraClient,
    limiter: RateLimiter,
    mapping: MappingTable,
    page_size: u32,
    project_key: String,
    initial_status: String,
    map_users: bool,
    start_date_field: Option<String>,
    phase: Mutex<Phase>,
}

impl Runner {
    /// Builds the clients, the shared rate limiter and the validated mapping
    /// table.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if a credential needed by the run mode is
    /// missing, the mapping table is incomplete or a client cannot be built.
    pub fn new(settings: Settings, config: RunnerConfig) -> Result<Self, RunnerError> {
        settings.check_credentials(config.mode())?;

        let mapping =
            MappingTable::from_settings(&settings.mapping, &settings.jira.default_issue_type)?;
        mapping.validate()?;

        let http = build_http_client(settings.request_timeout())?;
        let redmine = RedmineClient::new(
            http.clone(),
            settings.redmine.url.clone(),
            settings.redmine.api_key.as_deref().unwrap_or_default(),
        );
        let jira = JiraClient::new(
            http,
            &settings.jira.url,
            settings.jira.email.as_deref().unwrap_or_default(),
            settings.jira.api_token.as_deref().unwrap_or_default(),
        )?;

        let project_key = settings
            .jira
            .project_key
            .clone()
            .unwrap_or_else(|| config.criteria().project().to_string());

        Ok(Self {
            limiter: RateLimiter::from_settings(&settings.rate_limit),
            page_size: settings.redmine.page_size,
            initial_status: settings.jira.initial_status,
            map_users: settings.jira.map_users,
            start_date_field: settings.jira.start_date_field,
            config,
            redmine,
            jira,
            mapping,
            project_key,
            phase: Mutex::new(Phase::Idle),
        })
    }

    /// Returns the shared rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the phase the run is in, or ended in.
    pub async fn phase(&self) -> Phase {
        *self.phase.lock().await
    }

    /// Executes the phases of the configured mode in order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when a phase fails. Skipped or failed records
    /// are reported in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let mode = self.config.mode();
        let mut summary = RunSummary::new();
        info!(
            mode = %mode,
            project = %self.config.criteria().project(),
            cache = %self.config.cache_file().display(),
            "Starting migration run"
        );

        let mut phase = Phase::Idle;
        while let Some(next) = phase.next(mode) {
            phase = next;
            *self.phase.lock().await = phase;
            debug!(phase = %phase, "Entering phase");

            let result = match phase {
                Phase::Extracting => self.extract(&mut summary).await,
                Phase::Importing => self.import(&mut summary).await,
                Phase::Idle | Phase::Done | Phase::Failed => Ok(()),
            };

            if let Err(e) = result {
                *self.phase.lock().await = Phase::Failed;
                error!(failed_in = %phase, error = %e, "Run failed");
                return Err(e);
            }
        }

        summary.backoffs = self.limiter.stats().await.backoffs;
        Ok(summary)
    }

    async fn extract(&self, summary: &mut RunSummary) -> Result<(), RunnerError> {
        let extractor = Extractor::new(&self.redmine, &self.limiter, self.page_size);
        let report = extractor
            .extract_to_file(self.config.criteria(), self.config.cache_file())
            .await?;
        summary.extracted = Some(report.matched);
        Ok(())
    }

    async fn import(&self, summary: &mut RunSummary) -> Result<(), RunnerError> {
        let importer = Importer::new(&self.jira, &self.limiter, &self.mapping, &self.project_key)
            .with_initial_status(&self.initial_status)
            .with_user_mapping(self.map_users)
            .with_start_date_field(self.start_date_field.clone());
        let import = importer
            .import_file(self.config.cache_file(), self.config.resume())
            .await?;
        summary.record_import(&import);
        Ok(())
    }
}
