//! Access credential (RFID card) validation.
//!
//! The door controller publishes a check request carrying a card UID; the
//! validator looks the UID up in the registry and publishes a verdict back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       event::decode_card_check           │
//! │  - JSON object or base64-wrapped JSON    │
//! └─────────────────────────────────────────┘
//!          ↓ card_uid
//! ┌─────────────────────────────────────────┐
//! │       CredentialValidator                │
//! │  - blank UID → IncompleteInput           │
//! │  - registry error → INVALID              │
//! └─────────────────────────────────────────┘
//!     ↓ contains?               ↓ verdict
//! ┌──────────────────┐   ┌──────────────────┐
//! │ CredentialRegistry│   │ VerdictPublisher │
//! │ (SQLite)          │   │ (NATS)           │
//! └──────────────────┘   └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use domotica::credentials::{SqliteCredentialRegistry, Verdict};
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = SqliteCredentialRegistry::new("credentials.db")?;
//! registry.register("04AABBCC", Some("front door key"))?;
//! assert!(registry.exists("04AABBCC")?);
//! registry.revoke("04AABBCC")?;
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod storage;
mod validator;

pub use storage::{RegisteredCard, SqliteCredentialRegistry};
pub use validator::CredentialValidator;

#[cfg(test)]
mod tests;

/// Accept/reject decision for one credential
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Verdict plus the echoed identifier, as published to the controller.
///
/// Wire format: `{"status": "VALID", "card_uid": "04AABBCC"}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub status: Verdict,

    #[serde(rename = "card_uid")]
    pub credential_id: String,
}

/// Registry of accepted credentials.
#[async_trait]
pub trait CredentialRegistry: Send + Sync {
    /// Existence check by credential identifier
    async fn contains(&self, credential_id: &str) -> Result<bool>;
}

/// Response channel for validation verdicts.
#[async_trait]
pub trait VerdictPublisher: Send + Sync {
    async fn publish(&self, verdict: &VerdictResult) -> Result<()>;
}
