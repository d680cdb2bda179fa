//! Storage module for persisting job checkpoints
//!
//! This module handles all persistence for the job engine, including:
//! - SQLite database initialization and schema management
//! - Upserting job checkpoints keyed by job id
//! - Loading checkpoints back for display, export and resume
//!
//! Persistence is best-effort from the scheduler's point of view: a failing
//! store never changes a job's status.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryCheckpointStore;
pub use sqlite::{init_database, SqliteCheckpointStore};
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::inspection::InspectionResult;
use crate::state::JobStatus;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a checkpoint database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> StorageResult<SqliteCheckpointStore> {
    SqliteCheckpointStore::new(path)
}

/// A durable snapshot of a job's progress
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub job_id: String,
    pub status: JobStatus,
    pub site_url: String,
    pub total_urls: usize,
    pub completed_urls: usize,
    pub results: Vec<InspectionResult>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fault message of a failed job
    pub failure: Option<String>,
}

/// Checkpoint metadata without the result snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub site_url: String,
    pub total_urls: usize,
    pub completed_urls: usize,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Strips the result snapshot
    pub fn summary(&self) -> CheckpointSummary {
        CheckpointSummary {
            job_id: self.job_id.clone(),
            status: self.status,
            site_url: self.site_url.clone(),
            total_urls: self.total_urls,
            completed_urls: self.completed_urls,
            updated_at: self.updated_at,
        }
    }
}
