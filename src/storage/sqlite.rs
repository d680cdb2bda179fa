//! SQLite checkpoint store
//!
//! This module provides a SQLite-based implementation of the CheckpointStore trait.
//! The result snapshot is stored as a JSON array in a single column.

use crate::inspection::InspectionResult;
use crate::state::JobStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::{Checkpoint, CheckpointSummary};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite checkpoint backend
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

/// Raw column values of a checkpoint row, before validation
struct CheckpointRow {
    job_id: String,
    status: String,
    site_url: String,
    total_urls: i64,
    completed_urls: i64,
    started_at: String,
    updated_at: String,
    failure: Option<String>,
}

impl CheckpointRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            job_id: row.get(0)?,
            status: row.get(1)?,
            site_url: row.get(2)?,
            total_urls: row.get(3)?,
            completed_urls: row.get(4)?,
            started_at: row.get(5)?,
            updated_at: row.get(6)?,
            failure: row.get(7)?,
        })
    }

    fn corrupt(&self, reason: impl Into<String>) -> StorageError {
        StorageError::Corrupt {
            job_id: self.job_id.clone(),
            reason: reason.into(),
        }
    }

    fn timestamp(&self, value: &str) -> StorageResult<DateTime<Utc>> {
        value
            .parse::<DateTime<Utc>>()
            .map_err(|e| self.corrupt(format!("bad timestamp '{}': {}", value, e)))
    }

    fn into_summary(self) -> StorageResult<CheckpointSummary> {
        let status = JobStatus::from_db_string(&self.status)
            .ok_or_else(|| self.corrupt(format!("unknown status '{}'", self.status)))?;
        let total_urls = usize::try_from(self.total_urls)
            .map_err(|_| self.corrupt("negative total_urls"))?;
        let completed_urls = usize::try_from(self.completed_urls)
            .map_err(|_| self.corrupt("negative completed_urls"))?;
        let updated_at = self.timestamp(&self.updated_at)?;

        Ok(CheckpointSummary {
            job_id: self.job_id,
            status,
            site_url: self.site_url,
            total_urls,
            completed_urls,
            updated_at,
        })
    }

    fn into_checkpoint(self, results: Vec<InspectionResult>) -> StorageResult<Checkpoint> {
        let started_at = self.timestamp(&self.started_at)?;
        let failure = self.failure.clone();
        let summary = self.into_summary()?;

        if results.len() != summary.completed_urls {
            return Err(StorageError::Corrupt {
                job_id: summary.job_id,
                reason: format!(
                    "completed_urls is {} but {} results are stored",
                    summary.completed_urls,
                    results.len()
                ),
            });
        }

        Ok(Checkpoint {
            job_id: summary.job_id,
            status: summary.status,
            site_url: summary.site_url,
            total_urls: summary.total_urls,
            completed_urls: summary.completed_urls,
            results,
            started_at,
            updated_at: summary.updated_at,
            failure,
        })
    }
}

impl SqliteCheckpointStore {
    /// Opens (or creates) a checkpoint database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCheckpointStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = init_database(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Database(format!("Failed to lock connection: {}", e)))
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()> {
        let results = serde_json::to_string(&checkpoint.results)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO checkpoints
             (job_id, status, site_url, total_urls, completed_urls, results, started_at, updated_at, failure)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(job_id) DO UPDATE SET
                status = excluded.status,
                site_url = excluded.site_url,
                total_urls = excluded.total_urls,
                completed_urls = excluded.completed_urls,
                results = excluded.results,
                updated_at = excluded.updated_at,
                failure = excluded.failure",
            params![
                checkpoint.job_id,
                checkpoint.status.to_db_string(),
                checkpoint.site_url,
                checkpoint.total_urls as i64,
                checkpoint.completed_urls as i64,
                results,
                checkpoint.started_at.to_rfc3339(),
                checkpoint.updated_at.to_rfc3339(),
                checkpoint.failure,
            ],
        )?;
        Ok(())
    }

    fn load(&self, job_id: &str) -> StorageResult<Option<Checkpoint>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT job_id, status, site_url, total_urls, completed_urls, started_at, updated_at, failure, results
                 FROM checkpoints WHERE job_id = ?1",
                params![job_id],
                |row| Ok((CheckpointRow::from_row(row)?, row.get::<_, String>(8)?)),
            )
            .optional()?
        };

        match row {
            Some((row, results_json)) => {
                let results: Vec<InspectionResult> = serde_json::from_str(&results_json)?;
                row.into_checkpoint(results).map(Some)
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> StorageResult<Vec<CheckpointSummary>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT job_id, status, site_url, total_urls, completed_urls, started_at, updated_at, failure
                 FROM checkpoints ORDER BY updated_at DESC",
            )?;
            let rows = stmt
                .query_map([], CheckpointRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter().map(CheckpointRow::into_summary).collect()
    }

    fn delete(&self, job_id: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM checkpoints WHERE job_id = ?1", params![job_id])?;
        Ok(deleted > 0)
    }
}

/// Initializes or opens a database at the given path
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
