use super::{
    Intent, RequestKind, VoiceIntent, VoiceRequest, VoiceResponse, ACTION_SLOTS, DEVICE_SLOTS,
    LOCATION_SLOTS,
};
use crate::command::{read_state, translate, DeviceReading};
use crate::devices::UserDeviceMapping;
use crate::shadow::ShadowService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

const WELCOME: &str = "Bienvenido al sistema inteligente. ¿Qué deseas hacer?";
const WELCOME_REPROMPT: &str = "Puedes decir: enciende la luz de la sala.";
const HELP: &str = "Puedes dar órdenes como: abre la puerta de la cocina.";
const WHAT_NEXT: &str = "¿Qué deseas hacer?";
const ANYTHING_ELSE: &str = "¿Necesitas algo más?";
const GOODBYE: &str = "Adiós.";
const FALLBACK: &str = "No entendí tu orden. Intenta con: enciende la luz de la sala.";
const NO_DEVICE: &str = "No encuentro tu dispositivo asociado en la base de datos.";
const NOT_UNDERSTOOD: &str = "No entendí bien qué dispositivo quieres controlar.";
const STATE_UNAVAILABLE: &str = "No pude obtener el estado del dispositivo.";
const UNKNOWN_STATE: &str = "desconocido";
const ERROR: &str = "Ocurrió un error procesando tu solicitud.";
const ERROR_REPROMPT: &str = "¿Deseas intentar otra cosa?";

/// Handles voice requests against the device mapping and shadow service.
pub struct VoiceSkill {
    mappings: Arc<dyn UserDeviceMapping>,
    shadow: Arc<dyn ShadowService>,
    default_location: String,
}

impl VoiceSkill {
    pub fn new(
        mappings: Arc<dyn UserDeviceMapping>,
        shadow: Arc<dyn ShadowService>,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            mappings,
            shadow,
            default_location: default_location.into(),
        }
    }

    /// Answer one request. Never fails: unexpected errors become a spoken
    /// apology.
    pub async fn handle(&self, request: &VoiceRequest) -> VoiceResponse {
        let result = match &request.request {
            RequestKind::LaunchRequest => Ok(VoiceResponse::speak(WELCOME).ask(WELCOME_REPROMPT)),
            RequestKind::SessionEndedRequest => Ok(VoiceResponse::speak("")),
            RequestKind::IntentRequest { intent } => {
                self.handle_intent(request.user_id.as_deref(), intent).await
            }
        };

        result.unwrap_or_else(|e| {
            error!(error = ?e, "Voice request failed");
            VoiceResponse::speak(ERROR).ask(ERROR_REPROMPT)
        })
    }

    async fn handle_intent(&self, user_id: Option<&str>, intent: &Intent) -> Result<VoiceResponse> {
        match VoiceIntent::from_name(&intent.name) {
            VoiceIntent::ControlDevice => self.control_device(user_id, intent).await,
            VoiceIntent::DeviceState => self.device_state(user_id, intent).await,
            VoiceIntent::Help => Ok(VoiceResponse::speak(HELP).ask(WHAT_NEXT)),
            VoiceIntent::Stop => Ok(VoiceResponse::speak(GOODBYE)),
            VoiceIntent::Fallback => Ok(VoiceResponse::speak(FALLBACK).ask(WHAT_NEXT)),
        }
    }

    async fn control_device(&self, user_id: Option<&str>, intent: &Intent) -> Result<VoiceResponse> {
        let action = intent.slot(ACTION_SLOTS).unwrap_or_default();
        let device = intent.slot(DEVICE_SLOTS).unwrap_or_default();
        let location = intent.slot(LOCATION_SLOTS).unwrap_or(self.default_location.as_str());

        let Some(thing_name) = self.resolve_thing(user_id).await else {
            return Ok(VoiceResponse::speak(NO_DEVICE));
        };

        let command = match translate(device, location, action) {
            Ok(command) => command,
            Err(e) => {
                info!(reason = %e, "Voice command not understood");
                return Ok(VoiceResponse::speak(NOT_UNDERSTOOD));
            }
        };

        self.shadow
            .update_desired(&thing_name, command.desired())
            .await
            .with_context(|| format!("Failed to update shadow for '{}'", thing_name))?;

        info!(
            thing_name = %thing_name,
            attribute = %command.attribute,
            value = %command.value,
            "Voice command forwarded"
        );

        Ok(VoiceResponse::speak(format!("{} {} de la {}.", action, device, location)).ask(ANYTHING_ELSE))
    }

    async fn device_state(&self, user_id: Option<&str>, intent: &Intent) -> Result<VoiceResponse> {
        let device = intent.slot(DEVICE_SLOTS).unwrap_or_default();
        let location = intent.slot(LOCATION_SLOTS).unwrap_or(self.default_location.as_str());

        let Some(thing_name) = self.resolve_thing(user_id).await else {
            return Ok(VoiceResponse::speak(NO_DEVICE));
        };

        let reported = match self.shadow.get_reported(&thing_name).await {
            Ok(reported) => reported,
            Err(e) => {
                error!(thing_name = %thing_name, error = %e, "Failed to read shadow");
                return Ok(VoiceResponse::speak(STATE_UNAVAILABLE).ask(ANYTHING_ELSE));
            }
        };

        let state = match read_state(device, location, &reported) {
            DeviceReading::Known(value) => value,
            DeviceReading::Unknown => UNKNOWN_STATE.to_string(),
        };

        Ok(VoiceResponse::speak(format!(
            "El estado de la {} de la {} es {}.",
            device, location, state
        ))
        .ask(ANYTHING_ELSE))
    }

    /// Device assigned to the user. Lookup failures are logged and treated
    /// as "no device".
    async fn resolve_thing(&self, user_id: Option<&str>) -> Option<String> {
        let user_id = user_id.filter(|id| !id.is_empty())?;

        match self.mappings.device_for_user(user_id).await {
            Ok(thing_name) => thing_name,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Device mapping lookup failed");
                None
            }
        }
    }
}
