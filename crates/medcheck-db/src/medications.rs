//! Per-user medication list.

use crate::database::Database;
use crate::error::{DbError, Result};
use medcheck_common::MedicationEntry;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

/// Repository for the `drugs` table.
pub struct MedicationRepository {
    db: Arc<Database>,
}

impl MedicationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a medication to the user's list and return the row id.
    pub fn add(&self, username: &str, entry: &MedicationEntry) -> Result<i64> {
        entry.validate()?;
        let conn = self.db.conn()?;

        let owner: Option<i64> = conn
            .query_row("SELECT 1 FROM users WHERE username = ?1", params![username], |row| row.get(0))
            .optional()?;
        if owner.is_none() {
            return Err(DbError::NotFound(format!("user '{username}'")));
        }

        conn.execute(
            "INSERT INTO drugs (username, drug_name, dosage) VALUES (?1, ?2, ?3)",
            params![username, entry.name.trim(), entry.dosage.trim()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(username, drug = %entry.name, id, "Medication added");
        Ok(id)
    }

    /// All medications for `username`, in the order they were added.
    pub fn list(&self, username: &str) -> Result<Vec<MedicationEntry>> {
        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(
            "SELECT drug_name, dosage FROM drugs WHERE username = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![username], |row| {
            Ok(MedicationEntry { name: row.get(0)?, dosage: row.get(1)? })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn count(&self, username: &str) -> Result<usize> {
        let n: i64 = self.db.conn()?.query_row(
            "SELECT COUNT(*) FROM drugs WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}
