//! Audit log of actuator state transitions.
//!
//! The state-diff engine derives one [`AuditRecord`] per changed attribute;
//! an [`AuditStore`] persists each record keyed by actuator and timestamp.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod store;

pub use store::SqliteAuditStore;

#[cfg(test)]
mod tests;

/// One detected actuator change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Device (shadow thing) that reported the change
    pub thing_name: String,

    /// Attribute key as reported, e.g. "luz_sala"
    pub attribute: String,

    /// Opaque event timestamp supplied by the caller
    pub timestamp: String,

    /// Device-type segment of the attribute key
    pub actuator_type: String,

    /// Location segment of the attribute key
    pub location: String,

    /// New value in string form
    pub new_state: String,

    /// Previous value in string form (None on first report)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<String>,
}

impl AuditRecord {
    /// Primary key of the record: `<thing_name>_<attribute>`
    pub fn actuator_id(&self) -> String {
        format!("{}_{}", self.thing_name, self.attribute)
    }
}

/// Durable sink for audit records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Write one record. Writing the same (actuator, timestamp) pair twice
    /// replaces the earlier row.
    async fn put(&self, record: &AuditRecord) -> Result<()>;
}
