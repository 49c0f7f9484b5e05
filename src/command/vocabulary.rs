use serde::{Deserialize, Serialize};
use std::fmt;

/// Controllable or readable device kinds understood by voice commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Light,
    Door,
    Window,
    MotionSensor,
    Unrecognized,
}

impl DeviceType {
    /// Map a spoken device token (Spanish or English) to a device type.
    pub fn parse(token: &str) -> Self {
        match normalize_token(token).as_str() {
            "luz" | "luces" | "lampara" | "lámpara" | "light" | "lights" | "lamp" => {
                DeviceType::Light
            }
            "puerta" | "door" => DeviceType::Door,
            "ventana" | "window" => DeviceType::Window,
            "movimiento" | "sensor de movimiento" | "motion" | "motion sensor"
            | "motion-sensor" => DeviceType::MotionSensor,
            _ => DeviceType::Unrecognized,
        }
    }

    /// Attribute key prefix reported by the device firmware
    pub fn attribute_prefix(self) -> Option<&'static str> {
        match self {
            DeviceType::Light => Some("luz"),
            DeviceType::Door => Some("puerta"),
            DeviceType::Window => Some("ventana"),
            DeviceType::MotionSensor => Some("movimiento"),
            DeviceType::Unrecognized => None,
        }
    }
}

/// Spoken verbs understood by voice commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    TurnOn,
    TurnOff,
    Open,
    Close,
    Unrecognized,
}

impl Action {
    /// Map a spoken action token (Spanish or English) to an action.
    pub fn parse(token: &str) -> Self {
        match normalize_token(token).as_str() {
            "encender" | "enciende" | "prender" | "prende" | "turn on" | "switch on" | "on" => {
                Action::TurnOn
            }
            "apagar" | "apaga" | "turn off" | "switch off" | "off" => Action::TurnOff,
            "abrir" | "abre" | "open" => Action::Open,
            "cerrar" | "cierra" | "close" | "shut" => Action::Close,
            _ => Action::Unrecognized,
        }
    }

    pub fn command(self) -> Option<CanonicalCommand> {
        match self {
            Action::TurnOn => Some(CanonicalCommand::On),
            Action::TurnOff => Some(CanonicalCommand::Off),
            Action::Open => Some(CanonicalCommand::Open),
            Action::Close => Some(CanonicalCommand::Closed),
            Action::Unrecognized => None,
        }
    }
}

/// Normalized value written to a device attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalCommand {
    On,
    Off,
    Open,
    Closed,
}

impl CanonicalCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalCommand::On => "ON",
            CanonicalCommand::Off => "OFF",
            CanonicalCommand::Open => "OPEN",
            CanonicalCommand::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for CanonicalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case and collapse runs of whitespace
fn normalize_token(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
