// Device shadow documents and the shadow service port

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod memory;

pub use memory::{DesiredUpdate, MemoryShadowService};


/// Attribute key → reported value for every actuator of one device.
///
/// Backed by serde_json's ordered map, so iteration follows the order in
/// which the device reported its keys.
pub type Snapshot = Map<String, Value>;

/// Reported (device-asserted) and desired (controller-asserted) state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowState {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub reported: Snapshot,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub desired: Snapshot,
}

/// Service-held state document for one device
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowDocument {
    #[serde(default)]
    pub state: ShadowState,

    /// Incremented on every accepted update
    #[serde(default)]
    pub version: u64,

    /// Unix epoch seconds of the last update
    #[serde(default)]
    pub timestamp: i64,
}

/// Device-state service used to forward commands and answer state queries.
#[async_trait]
pub trait ShadowService: Send + Sync {
    /// Merge `desired` into the device's desired-state document.
    async fn update_desired(&self, thing_name: &str, desired: Snapshot) -> Result<()>;

    /// Fetch the device's full reported-state snapshot.
    async fn get_reported(&self, thing_name: &str) -> Result<Snapshot>;
}

/// Merge `update` into `target`. A `null` value deletes the key.
pub(crate) fn merge_snapshot(target: &mut Snapshot, update: Snapshot) {
    for (key, value) in update {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}
