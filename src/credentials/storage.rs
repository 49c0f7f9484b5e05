//! Credential registry using SQLite.
//!
//! Only presence matters for validation; the label and creation time are
//! kept for administration.

use super::CredentialRegistry;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// One accepted card
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisteredCard {
    pub card_uid: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registry of valid RFID cards backed by SQLite.
///
/// # Schema
/// ```sql
/// CREATE TABLE valid_rfid_cards (
///     card_uid   TEXT PRIMARY KEY,
///     label      TEXT,             -- optional, e.g. owner name
///     created_at TEXT NOT NULL     -- ISO 8601 timestamp
/// );
/// ```
///
/// # Thread Safety
/// - Connection is wrapped in Mutex for safe concurrent access
pub struct SqliteCredentialRegistry {
    conn: Mutex<Connection>,
}

impl SqliteCredentialRegistry {
    /// Creates or opens a registry.
    ///
    /// # Arguments
    /// * `db_path` - Path to SQLite database file (":memory:" for tests)
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open credential registry")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS valid_rfid_cards (
                card_uid   TEXT PRIMARY KEY,
                label      TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )
        .context("Failed to create valid_rfid_cards table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Credential registry lock poisoned"))
    }

    /// Registers a card. Re-registering replaces its label.
    pub fn register(&self, card_uid: &str, label: Option<&str>) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.lock()?
            .execute(
                r#"
                INSERT INTO valid_rfid_cards (card_uid, label, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(card_uid) DO UPDATE SET label = excluded.label
                "#,
                params![card_uid, label, now],
            )
            .context("Failed to register card")?;

        Ok(())
    }

    /// Removes a card.
    ///
    /// # Returns
    /// * `Ok(true)` - Card removed
    /// * `Ok(false)` - Card was not registered
    pub fn revoke(&self, card_uid: &str) -> Result<bool> {
        let rows_affected = self
            .lock()?
            .execute(
                "DELETE FROM valid_rfid_cards WHERE card_uid = ?1",
                params![card_uid],
            )
            .context("Failed to revoke card")?;

        Ok(rows_affected > 0)
    }

    pub fn exists(&self, card_uid: &str) -> Result<bool> {
        let found: Option<String> = self
            .lock()?
            .query_row(
                "SELECT card_uid FROM valid_rfid_cards WHERE card_uid = ?1",
                params![card_uid],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up card")?;

        Ok(found.is_some())
    }

    /// Lists every registered card ordered by UID.
    pub fn list(&self) -> Result<Vec<RegisteredCard>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT card_uid, label, created_at FROM valid_rfid_cards ORDER BY card_uid")
            .context("Failed to prepare query")?;

        let rows = stmt
            .query_map([], |row| {
                let card_uid: String = row.get(0)?;
                let label: Option<String> = row.get(1)?;
                let created_at: String = row.get(2)?;
                Ok((card_uid, label, created_at))
            })
            .context("Failed to execute query")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read results")?;

        rows.into_iter()
            .map(|(card_uid, label, created_at)| -> Result<RegisteredCard> {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .context("Invalid created_at timestamp")?
                    .with_timezone(&Utc);
                Ok(RegisteredCard {
                    card_uid,
                    label,
                    created_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CredentialRegistry for SqliteCredentialRegistry {
    async fn contains(&self, credential_id: &str) -> Result<bool> {
        self.exists(credential_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_registry() -> SqliteCredentialRegistry {
        SqliteCredentialRegistry::new(":memory:").expect("Failed to create test registry")
    }

    #[test]
    fn test_register_and_exists() {
        let registry = create_test_registry();

        registry.register("04AABBCC", Some("Gabriel")).unwrap();

        assert!(registry.exists("04AABBCC").unwrap());
        assert!(!registry.exists("DEADBEEF").unwrap());
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = create_test_registry();
        registry.register("04AABBCC", None).unwrap();

        assert!(!registry.exists("04aabbcc").unwrap());
        assert!(!registry.exists("04AABB").unwrap());
    }

    #[test]
    fn test_reregister_updates_label() {
        let registry = create_test_registry();

        registry.register("04AABBCC", Some("old")).unwrap();
        registry.register("04AABBCC", Some("new")).unwrap();

        let cards = registry.list().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].label.as_deref(), Some("new"));
    }

    #[test]
    fn test_revoke() {
        let registry = create_test_registry();
        registry.register("04AABBCC", None).unwrap();

        assert!(registry.revoke("04AABBCC").unwrap());
        assert!(!registry.revoke("04AABBCC").unwrap());
        assert!(!registry.exists("04AABBCC").unwrap());
    }

    #[test]
    fn test_list_ordered() {
        let registry = create_test_registry();
        registry.register("BB", None).unwrap();
        registry.register("AA", Some("first")).unwrap();

        let uids: Vec<String> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.card_uid)
            .collect();
        assert_eq!(uids, vec!["AA", "BB"]);
    }

    #[tokio::test]
    async fn test_registry_trait_lookup() {
        let registry = create_test_registry();
        registry.register("04AABBCC", None).unwrap();

        assert!(registry.contains("04AABBCC").await.unwrap());
        assert!(!registry.contains("nope").await.unwrap());
    }
}
