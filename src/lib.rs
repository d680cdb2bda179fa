//! Sumi-Inspect: a polite bulk URL inspector
//!
//! This crate drives large URL lists through a rate-limited indexing-status
//! API in fixed-size batches, checkpoints progress for crash recovery, and
//! aggregates the results into coverage statistics.

pub mod config;
pub mod inspection;
pub mod output;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Inspect operations
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Job control error: {0}")]
    Control(#[from] scheduler::ControlError),

    #[error("Checkpoint {job_id} cannot be resumed: {reason}")]
    Resume { job_id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL and URL-list errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("URL list is empty")]
    EmptyList,

    #[error("URL list has {count} entries, the maximum is {max}")]
    TooMany { count: usize, max: usize },
}

/// Result type alias for Sumi-Inspect operations
pub type Result<T> = std::result::Result<T, InspectError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use inspection::{IndexStatus, InspectionOutcome, InspectionResult, Inspector};
pub use scheduler::{JobController, JobHandle};
pub use state::{Job, JobProgress, JobStatus};
