//! CLI for the Redmine → Jira migrator.
//!
//! Extracts issues from a Redmine project into a JSON cache file and imports
//! them into Jira, either in one run or as separate steps.

use clap::Parser;
use redmine_jira_migrator::{
    load_settings, FilterCriteria, IssuePriority, IssueStatus, RunMode, RunSummary, Runner,
    RunnerConfig, RunnerError,
};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Redmine → Jira migrator - Extract Redmine issues and import them into Jira.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Extract from Redmine, then import the result into Jira.
    #[arg(short = 'x', long, conflicts_with = "extract_only")]
    activate_extraction: bool,

    /// Extract from Redmine without importing.
    #[arg(short, long)]
    extract_only: bool,

    /// JSON cache file. Required when only importing.
    #[arg(short, long, required_unless_present_any = ["activate_extraction", "extract_only"])]
    filename: Option<PathBuf>,

    /// Redmine project identifier.
    #[arg(short, long)]
    project: String,

    /// Export attachments (not implemented).
    #[arg(short, long)]
    attachments: bool,

    /// Export comments (not implemented).
    #[arg(short, long)]
    comments: bool,

    /// Status filter, comma separated.
    #[arg(short, long, value_delimiter = ',', help = status_help())]
    status: Vec<IssueStatus>,

    /// Priority filter, comma separated. Also accepted as `-pr`.
    #[arg(long, value_delimiter = ',', help = priority_help())]
    priority: Vec<IssuePriority>,

    /// Verbose logging.
    #[arg(short, long)]
    debug: bool,

    /// Settings file.
    #[arg(long, env = "MIGRATOR_CONFIG", default_value = "migrator.toml")]
    config: PathBuf,

    /// Continue an interrupted import from its checkpoint.
    #[arg(long)]
    resume: bool,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn mode(&self) -> RunMode {
        if self.extract_only {
            RunMode::ExtractOnly
        } else if self.activate_extraction {
            RunMode::Combined
        } else {
            RunMode::ImportOnly
        }
    }
}

fn status_help() -> String {
    format!(
        "Status filter, comma separated: {}",
        IssueStatus::help_text()
    )
}

fn priority_help() -> String {
    format!(
        "Priority filter (-pr), comma separated: {}",
        IssuePriority::help_text()
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse_from(normalize_args(std::env::args_os()));

    if let Err(e) = init_tracing(args.debug, args.log_file.as_deref()) {
        eprintln!(
            "Failed to open log file {}: {e}",
            args.log_file.as_deref().unwrap_or(Path::new("")).display()
        );
        return ExitCode::from(1);
    }

    let mode = args.mode();
    match run(args).await {
        Ok(summary) => {
            print_summary(mode, &summary);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(1)
        }
    }
}

/// Rewrites the two-letter `-pr` short flag into `--priority`, which clap
/// cannot express as a short option. `-pr=3` and `-pr3` carry their value.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(value) = arg.to_str().and_then(|a| a.strip_prefix("-pr")) else {
                return arg;
            };
            match value.strip_prefix('=').unwrap_or(value) {
                "" => OsString::from("--priority"),
                value => OsString::from(format!("--priority={value}")),
            }
        })
        .collect()
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG`, defaulting to "info" or "debug"
/// - An optional plain-text copy of the output in `log_file`
fn init_tracing(debug: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let default_level = if debug { "debug" } else { "info" };

    let file_layer = match log_file {
        Some(path) => {
            let file: File = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(file_layer)
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    Ok(())
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    if args.attachments {
        warn!("--attachments is not implemented, ignoring");
    }
    if args.comments {
        warn!("--comments is not implemented, ignoring");
    }

    let settings = load_settings(&args.config)?;
    let mode = args.mode();
    let criteria = FilterCriteria::new(args.project, args.status, args.priority);

    let mut config = RunnerConfig::new(mode, criteria).with_resume(args.resume);
    if let Some(path) = args.filename {
        config = config.with_cache_file(path);
    }

    let runner = Runner::new(settings, config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(mode: RunMode, summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Mode: {mode}");
    if let Some(extracted) = summary.extracted {
        println!("  Issues extracted: {extracted}");
    }

    if mode.imports() {
        println!("  Issues created: {}", summary.created);
        println!("  Issues skipped: {}", summary.skipped);
        println!("  Issues failed: {}", summary.failed);
        println!("  Result: {}", import_result(summary));
    }
    if summary.backoffs > 0 {
        println!("  Rate-limit backoffs: {}", summary.backoffs);
    }
}

fn import_result(summary: &RunSummary) -> &'static str {
    if summary.all_success() {
        "all records imported"
    } else if summary.has_failures() {
        "some records failed, see the log"
    } else {
        "completed with skipped records"
    }
}
