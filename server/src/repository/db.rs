//! Database Connection and Setup
//!
//! Opens the SQLite database and runs migrations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Connection shared by all repositories
pub type SharedConnection = Arc<Mutex<Connection>>;

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Database(format!("stored JSON is invalid: {}", err))
    }
}

/// Open (or create) the database file and migrate it
pub fn open_database(path: &Path) -> DomainResult<SharedConnection> {
    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    tracing::info!(path = %path.display(), "database ready");
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fresh in-memory database, used by tests and `--db :memory:`
pub fn open_in_memory() -> DomainResult<SharedConnection> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS issues (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            issue_type TEXT NOT NULL DEFAULT 'task',
            parent_id TEXT REFERENCES issues(id) ON DELETE SET NULL,
            sort_order REAL NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_issues_column
            ON issues(project_id, status, sort_order);
        CREATE INDEX IF NOT EXISTS idx_issues_parent ON issues(parent_id);

        CREATE TABLE IF NOT EXISTS boards (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            name TEXT NOT NULL,
            column_config TEXT NOT NULL,
            filter TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER,
            updated_at INTEGER
        );",
    )?;
    Ok(())
}

/// Current time in epoch milliseconds
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
