//! Voice front-end integration.
//!
//! The voice platform delivers an already-parsed request: a request type,
//! the user id, and for intents the intent name plus named slot values.
//! [`VoiceSkill`] turns it into a shadow update or a state query and answers
//! with speech.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod skill;

pub use skill::VoiceSkill;


/// Slot names (with Spanish aliases) read from intents
pub const ACTION_SLOTS: &[&str] = &["action", "accion"];
pub const DEVICE_SLOTS: &[&str] = &["device", "dispositivo"];
pub const LOCATION_SLOTS: &[&str] = &["location", "lugar"];

/// Inbound voice request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoiceRequest {
    /// Voice-platform user id, used to resolve the user's device
    #[serde(default)]
    pub user_id: Option<String>,

    pub request: RequestKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestKind {
    LaunchRequest,
    IntentRequest { intent: Intent },
    SessionEndedRequest,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,

    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// First non-empty value among the given slot names
    pub fn slot(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.slots.get(*name))
            .filter_map(|slot| slot.value.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

/// Intents the skill distinguishes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceIntent {
    ControlDevice,
    DeviceState,
    Help,
    Stop,
    Fallback,
}

impl VoiceIntent {
    /// Map an intent name; unknown names are handled as fallback.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ControlarDispositivoIntent" => VoiceIntent::ControlDevice,
            "EstadoDispositivoIntent" => VoiceIntent::DeviceState,
            "AMAZON.HelpIntent" => VoiceIntent::Help,
            "AMAZON.CancelIntent" | "AMAZON.StopIntent" => VoiceIntent::Stop,
            _ => VoiceIntent::Fallback,
        }
    }
}

/// Spoken answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub speech: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,

    pub should_end_session: bool,
}

impl VoiceResponse {
    /// Speak and end the session
    pub fn speak(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: None,
            should_end_session: true,
        }
    }

    /// Keep the session open with a reprompt
    pub fn ask(mut self, reprompt: impl Into<String>) -> Self {
        self.reprompt = Some(reprompt.into());
        self.should_end_session = false;
        self
    }
}
