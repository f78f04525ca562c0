#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod cache;
pub mod client;
pub mod config;
pub mod extract;
pub mod filter;
pub mod import;
pub mod issue;
pub mod mapping;
pub mod rate_limit;
pub mod runner;
pub mod summary;

pub use cache::{read_cache, write_cache, CacheError};
pub use client::{build_http_client, ApiError, JiraClient, RedmineClient};
pub use config::{load_settings, ConfigError, Settings};
pub use extract::{ExtractError, ExtractReport, Extractor};
pub use filter::FilterCriteria;
pub use import::{Checkpoint, ImportError, Importer};
pub use issue::{IssuePriority, IssueRecord, IssueStatus, ParseCodeError};
pub use mapping::{MappingError, MappingTable};
pub use rate_limit::{RateLimiter, RateLimiterStats, RetryPolicy};
pub use runner::{Phase, RunMode, Runner, RunnerConfig, RunnerError};
pub use summary::{ImportSummary, RecordOutcome, RunSummary};
