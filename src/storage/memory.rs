//! In-memory checkpoint store
//!
//! A non-durable store for embedding the controller without a database;
//! the scheduler tests run on it. Nothing survives the process.

use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::{Checkpoint, CheckpointSummary};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Checkpoint store backed by a `HashMap`
#[derive(Default)]
pub struct MemoryCheckpointStore {
    checkpoints: Mutex<HashMap<String, Checkpoint>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, Checkpoint>>> {
        self.checkpoints
            .lock()
            .map_err(|e| StorageError::Database(format!("Failed to lock store: {}", e)))
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()> {
        let mut map = self.lock()?;
        let started_at = map
            .get(&checkpoint.job_id)
            .map(|existing| existing.started_at)
            .unwrap_or(checkpoint.started_at);

        let mut stored = checkpoint.clone();
        stored.started_at = started_at;
        map.insert(stored.job_id.clone(), stored);
        Ok(())
    }

    fn load(&self, job_id: &str) -> StorageResult<Option<Checkpoint>> {
        Ok(self.lock()?.get(job_id).cloned())
    }

    fn list(&self) -> StorageResult<Vec<CheckpointSummary>> {
        let mut summaries: Vec<_> = self.lock()?.values().map(Checkpoint::summary).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    fn delete(&self, job_id: &str) -> StorageResult<bool> {
        Ok(self.lock()?.remove(job_id).is_some())
    }
}
