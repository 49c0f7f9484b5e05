use super::vocabulary::{Action, CanonicalCommand, DeviceType};
use crate::shadow::Snapshot;
use crate::state::{value_string, AttributeKey};
use serde_json::Value;
use thiserror::Error;

/// Location used when the spoken location is empty
pub const DEFAULT_LOCATION: &str = "sala";

/// A voice command resolved to a device attribute and its target value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowCommand {
    pub attribute: AttributeKey,
    pub value: CanonicalCommand,
}

impl ShadowCommand {
    /// Attribute key as written to the shadow, e.g. "luz_sala"
    pub fn attribute_key(&self) -> String {
        self.attribute.to_string()
    }

    /// Desired-state fragment for a merge update
    pub fn desired(&self) -> Snapshot {
        let mut desired = Snapshot::new();
        desired.insert(
            self.attribute_key(),
            Value::String(self.value.as_str().to_string()),
        );
        desired
    }
}

/// Voice slots that do not map onto the closed vocabularies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unrecognized device '{0}'")]
    UnrecognizedDevice(String),

    #[error("unrecognized action '{0}'")]
    UnrecognizedAction(String),
}

/// Current value of a device attribute as read from reported state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceReading {
    Known(String),
    /// Attribute absent from reported state or device not recognized
    Unknown,
}

/// Canonical location segment: lower-case, no whitespace or underscores,
/// Spanish accents folded. Empty input falls back to [`DEFAULT_LOCATION`].
pub fn normalize_location(location: &str) -> String {
    let normalized: String = location
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect();

    if normalized.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        normalized
    }
}

/// Attribute key for a spoken device and location.
///
/// Returns `None` when the device is outside the vocabulary, whatever the
/// location.
pub fn device_attribute(device_type: &str, location: &str) -> Option<AttributeKey> {
    DeviceType::parse(device_type)
        .attribute_prefix()
        .map(|prefix| AttributeKey::new(prefix, normalize_location(location)))
}

/// Canonical command for a spoken action
pub fn command_value(action: &str) -> Option<CanonicalCommand> {
    Action::parse(action).command()
}

/// Translate a parsed voice intent into a shadow command.
///
/// # Examples
///
/// ```
/// use domotica::command::{translate, CanonicalCommand};
///
/// let command = translate("light", "living room", "turn on").unwrap();
/// assert_eq!(command.attribute_key(), "luz_livingroom");
/// assert_eq!(command.value, CanonicalCommand::On);
///
/// assert!(translate("thermostat", "sala", "encender").is_err());
/// ```
pub fn translate(
    device_type: &str,
    location: &str,
    action: &str,
) -> Result<ShadowCommand, TranslateError> {
    let attribute = device_attribute(device_type, location)
        .ok_or_else(|| TranslateError::UnrecognizedDevice(device_type.to_string()))?;
    let value = command_value(action)
        .ok_or_else(|| TranslateError::UnrecognizedAction(action.to_string()))?;

    Ok(ShadowCommand { attribute, value })
}

/// Read the reported value of a spoken device and location.
pub fn read_state(device_type: &str, location: &str, reported: &Snapshot) -> DeviceReading {
    device_attribute(device_type, location)
        .and_then(|attribute| reported.get(&attribute.to_string()))
        .map(|value| DeviceReading::Known(value_string(value)))
        .unwrap_or(DeviceReading::Unknown)
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' => 'a',
        'é' | 'è' => 'e',
        'í' | 'ì' => 'i',
        'ó' | 'ò' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        other => other,
    }
}
