use super::attribute::AttributeKey;
use crate::audit::AuditRecord;
use crate::error::IncompleteInput;
use crate::shadow::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String form of a value that is absent on one side of the diff
pub const ABSENT_VALUE: &str = "none";

/// How two reported values are compared
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueComparison {
    /// Compare string forms, so `1` and `"1"` are equal
    #[default]
    Normalized,
    /// Compare JSON values exactly, so `1` and `"1"` differ
    Strict,
}

/// Diff behaviour knobs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPolicy {
    /// Emit a record (new state "none") for keys only present in `previous`.
    /// Off by default: removals are not treated as changes.
    #[serde(default)]
    pub report_removals: bool,

    #[serde(default)]
    pub comparison: ValueComparison,
}

/// Compares two reported-state snapshots and derives audit records.
///
/// The engine holds no state besides its policy; diffing the same pair twice
/// yields the same records in the same order.
#[derive(Clone, Debug, Default)]
pub struct StateDiffEngine {
    policy: DiffPolicy,
}

impl StateDiffEngine {
    pub fn new(policy: DiffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DiffPolicy {
        self.policy
    }

    /// Diff `previous` against `current` for one device.
    ///
    /// Walks the union of keys: first every key of `current` in its order,
    /// then (only with `report_removals`) the keys that exist solely in
    /// `previous`, in their order. A key is reported when its current value
    /// differs from the previous one or has no previous value.
    ///
    /// Returns `IncompleteInput` without diffing when the device id or
    /// timestamp is empty or `current` has no keys.
    pub fn diff(
        &self,
        previous: &Snapshot,
        current: &Snapshot,
        thing_name: &str,
        timestamp: &str,
    ) -> Result<Vec<AuditRecord>, IncompleteInput> {
        if thing_name.is_empty() {
            return Err(IncompleteInput::MissingDeviceId);
        }
        if timestamp.is_empty() {
            return Err(IncompleteInput::MissingTimestamp);
        }
        if current.is_empty() {
            return Err(IncompleteInput::EmptySnapshot);
        }

        let mut records = Vec::new();

        for (key, value) in current {
            let previous_value = previous.get(key);
            if self.changed(previous_value, value) {
                records.push(build_record(
                    thing_name,
                    timestamp,
                    key,
                    value_string(value),
                    previous_value.map(value_string),
                ));
            }
        }

        if self.policy.report_removals {
            for (key, previous_value) in previous {
                if !current.contains_key(key) {
                    records.push(build_record(
                        thing_name,
                        timestamp,
                        key,
                        ABSENT_VALUE.to_string(),
                        Some(value_string(previous_value)),
                    ));
                }
            }
        }

        Ok(records)
    }

    fn changed(&self, previous: Option<&Value>, current: &Value) -> bool {
        match previous {
            None => true,
            Some(previous) => match self.policy.comparison {
                ValueComparison::Normalized => value_string(previous) != value_string(current),
                ValueComparison::Strict => previous != current,
            },
        }
    }
}

/// Diff with the default policy (no removals, string-normalized comparison).
pub fn diff(
    previous: &Snapshot,
    current: &Snapshot,
    thing_name: &str,
    timestamp: &str,
) -> Result<Vec<AuditRecord>, IncompleteInput> {
    StateDiffEngine::default().diff(previous, current, thing_name, timestamp)
}

/// String form stored in audit records: strings verbatim, null as "none",
/// everything else as its JSON text.
pub fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => ABSENT_VALUE.to_string(),
        other => other.to_string(),
    }
}

fn build_record(
    thing_name: &str,
    timestamp: &str,
    key: &str,
    new_state: String,
    previous_state: Option<String>,
) -> AuditRecord {
    let parsed = AttributeKey::parse(key);

    AuditRecord {
        thing_name: thing_name.to_string(),
        attribute: key.to_string(),
        timestamp: timestamp.to_string(),
        actuator_type: parsed.device_type,
        location: parsed.location,
        new_state,
        previous_state,
    }
}
