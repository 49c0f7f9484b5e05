//! Audit record persistence using SQLite.

use super::{AuditRecord, AuditStore};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Persists audit records in SQLite.
///
/// # Schema
/// ```sql
/// CREATE TABLE actuator_state_changes (
///     actuator_id    TEXT NOT NULL,   -- "<thing_name>_<attribute>"
///     timestamp      TEXT NOT NULL,   -- opaque, caller-supplied
///     thing_name     TEXT NOT NULL,
///     attribute      TEXT NOT NULL,
///     actuator_type  TEXT NOT NULL,
///     location       TEXT NOT NULL,
///     new_state      TEXT NOT NULL,
///     previous_state TEXT,
///     PRIMARY KEY (actuator_id, timestamp)
/// );
/// ```
pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    /// Opens (or creates) the SQLite database and ensures the table exists.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open audit DB at {}", db_path))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_table()?;
        Ok(store)
    }

    fn create_table(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS actuator_state_changes (
                actuator_id    TEXT NOT NULL,
                timestamp      TEXT NOT NULL,
                thing_name     TEXT NOT NULL,
                attribute      TEXT NOT NULL,
                actuator_type  TEXT NOT NULL,
                location       TEXT NOT NULL,
                new_state      TEXT NOT NULL,
                previous_state TEXT,
                PRIMARY KEY (actuator_id, timestamp)
            );",
        )
        .context("Failed to create actuator_state_changes table")?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Audit DB connection lock poisoned"))
    }

    /// Inserts or replaces one record.
    pub fn insert(&self, record: &AuditRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO actuator_state_changes (
                actuator_id, timestamp, thing_name, attribute,
                actuator_type, location, new_state, previous_state
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.actuator_id(),
                record.timestamp,
                record.thing_name,
                record.attribute,
                record.actuator_type,
                record.location,
                record.new_state,
                record.previous_state,
            ],
        )
        .context("Failed to insert audit record")?;
        Ok(())
    }

    /// Returns every record for one actuator in insertion order.
    ///
    /// Timestamps are opaque text, so they are not used for ordering. A
    /// replaced record counts as newly inserted.
    pub fn history(&self, actuator_id: &str) -> Result<Vec<AuditRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT thing_name, attribute, timestamp, actuator_type, location,
                        new_state, previous_state
                 FROM actuator_state_changes
                 WHERE actuator_id = ?1
                 ORDER BY rowid ASC",
            )
            .context("Failed to prepare history query")?;

        let rows = stmt
            .query_map(params![actuator_id], |row| {
                Ok(AuditRecord {
                    thing_name: row.get(0)?,
                    attribute: row.get(1)?,
                    timestamp: row.get(2)?,
                    actuator_type: row.get(3)?,
                    location: row.get(4)?,
                    new_state: row.get(5)?,
                    previous_state: row.get(6)?,
                })
            })
            .context("Failed to query audit history")?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.context("Failed to read audit row")?);
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn put(&self, record: &AuditRecord) -> Result<()> {
        self.insert(record)
    }
}
