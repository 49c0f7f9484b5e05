use crate::shadow::{ShadowDocument, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod decode;

pub use decode::{decode_card_check, decode_documents_event, DecodeError};

/// DocumentsEvent is the shadow service's notification for one accepted
/// reported-state update.
///
/// Every field is optional on the wire: an event missing the thing name,
/// timestamp or current document is skipped by the state-change processor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentsEvent {
    /// Device the documents belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thing_name: Option<String>,

    /// Opaque event time (number or string), copied verbatim into audit records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,

    /// Document before the update (absent on first report)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<ShadowDocument>,

    /// Document after the update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ShadowDocument>,
}

impl DocumentsEvent {
    /// Thing name, if present and non-empty
    pub fn device_id(&self) -> Option<&str> {
        self.thing_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Timestamp rendered as a string, if present and non-empty.
    ///
    /// A numeric zero counts as missing.
    pub fn timestamp_string(&self) -> Option<String> {
        self.timestamp
            .as_ref()
            .filter(|ts| ts.as_f64() != Some(0.0))
            .and_then(opaque_string)
    }

    pub fn previous_reported(&self) -> Snapshot {
        self.previous
            .as_ref()
            .map(|d| d.state.reported.clone())
            .unwrap_or_default()
    }

    pub fn current_reported(&self) -> Snapshot {
        self.current
            .as_ref()
            .map(|d| d.state.reported.clone())
            .unwrap_or_default()
    }
}

/// RFID check request published by the door controller
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardCheckRequest {
    #[serde(default)]
    pub card_uid: Option<String>,
}

/// Render a scalar JSON value as an opaque identifier string.
///
/// Strings are taken as-is, numbers and booleans by their JSON text; null,
/// empty strings and containers yield `None`.
pub fn opaque_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
