//! Database schema definitions
//!
//! This module contains the SQL schema for the Sumi-Inspect checkpoint database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per job, overwritten on every checkpoint
CREATE TABLE IF NOT EXISTS checkpoints (
    job_id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    site_url TEXT NOT NULL,
    total_urls INTEGER NOT NULL,
    completed_urls INTEGER NOT NULL,
    results TEXT NOT NULL,
    started_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    failure TEXT
);

CREATE INDEX IF NOT EXISTS idx_checkpoints_updated ON checkpoints(updated_at);
CREATE INDEX IF NOT EXISTS idx_checkpoints_status ON checkpoints(status);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_checkpoints_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='checkpoints'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
