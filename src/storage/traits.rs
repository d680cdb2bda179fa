//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::storage::{Checkpoint, CheckpointSummary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt checkpoint {job_id}: {reason}")]
    Corrupt { job_id: String, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backends
///
/// Implementations must be shareable across threads; the scheduler hands
/// writes to the blocking pool.
pub trait CheckpointStore: Send + Sync {
    /// Inserts or replaces the checkpoint for `checkpoint.job_id`
    fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()>;

    /// Loads the checkpoint for a job, if any
    fn load(&self, job_id: &str) -> StorageResult<Option<Checkpoint>>;

    /// Lists stored checkpoints, most recently updated first
    fn list(&self) -> StorageResult<Vec<CheckpointSummary>>;

    /// Removes a checkpoint; returns false if none existed
    fn delete(&self, job_id: &str) -> StorageResult<bool>;
}
