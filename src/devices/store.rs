//! User → device mapping persistence using SQLite.

use super::UserDeviceMapping;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

/// Persists which thing each voice user controls.
pub struct SqliteDeviceMappingStore {
    conn: Mutex<Connection>,
}

impl SqliteDeviceMappingStore {
    /// Opens (or creates) the SQLite database and ensures the table exists.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open device mapping DB at {}", db_path))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_table()?;
        Ok(store)
    }

    fn create_table(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_thing_mapping (
                user_id    TEXT PRIMARY KEY,
                thing_name TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .context("Failed to create user_thing_mapping table")?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Device mapping DB lock poisoned"))
    }

    /// Assigns a thing to a user, replacing any previous assignment.
    pub fn assign(&self, user_id: &str, thing_name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO user_thing_mapping (user_id, thing_name, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                thing_name = excluded.thing_name,
                updated_at = excluded.updated_at",
            params![user_id, thing_name, Utc::now().to_rfc3339()],
        )
        .context("Failed to assign device")?;
        Ok(())
    }

    /// Removes a user's assignment. Returns whether one existed.
    pub fn remove(&self, user_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "DELETE FROM user_thing_mapping WHERE user_id = ?1",
                params![user_id],
            )
            .context("Failed to remove device assignment")?;
        Ok(rows > 0)
    }

    pub fn get(&self, user_id: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let thing_name = conn
            .query_row(
                "SELECT thing_name FROM user_thing_mapping WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up device assignment")?;
        Ok(thing_name)
    }
}

#[async_trait]
impl UserDeviceMapping for SqliteDeviceMappingStore {
    async fn device_for_user(&self, user_id: &str) -> Result<Option<String>> {
        self.get(user_id)
    }
}
