//! Database connection and schema management.

use crate::error::{DbError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub const TABLE_USERS: &str = "users";
pub const TABLE_DRUGS: &str = "drugs";

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY,
        password_hash TEXT NOT NULL,
        height        REAL NOT NULL,
        weight        REAL NOT NULL,
        comorbidities TEXT NOT NULL DEFAULT '',
        route         TEXT NOT NULL,
        gender        TEXT NOT NULL,
        substance_use TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS drugs (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        username  TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
        drug_name TEXT NOT NULL,
        dosage    TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_drugs_username ON drugs(username);
";

/// Main database handle. Share it between repositories behind an `Arc`.
pub struct Database {
    conn: Mutex<Connection>,
    path: String,
}

impl Database {
    /// Open or create a database file at `path` and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
            path: path.to_string_lossy().to_string(),
        };
        db.initialize()?;
        tracing::info!(path = %db.path, "Database opened");
        Ok(db)
    }

    /// Private in-memory database, used by tests and ephemeral runs.
    pub fn in_memory() -> Result<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: ":memory:".to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Create tables and indexes if they don't exist. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<u64> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(DatabaseStats {
            users: count(TABLE_USERS)?,
            drugs: count(TABLE_DRUGS)?,
        })
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub users: u64,
    pub drugs: u64,
}
