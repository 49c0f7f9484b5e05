use super::{CardCheckRequest, DocumentsEvent};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while turning a raw payload into an inbound event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload is neither JSON nor base64-encoded JSON: {0}")]
    Malformed(String),

    #[error("payload must be a JSON object")]
    NotObject,
}

/// Decode an RFID check request.
///
/// Accepted shapes:
/// - a JSON object: `{"card_uid": "..."}`
/// - a JSON string holding base64-encoded JSON
/// - raw base64 text of the JSON object
///
/// A missing `card_uid` is not a decode error; the validator reports it.
pub fn decode_card_check(payload: &[u8]) -> Result<CardCheckRequest, DecodeError> {
    let value = match serde_json::from_slice::<Value>(payload) {
        Ok(Value::String(encoded)) => decode_base64_json(encoded.as_bytes())?,
        Ok(value) => value,
        Err(_) => decode_base64_json(payload)?,
    };

    if !value.is_object() {
        return Err(DecodeError::NotObject);
    }

    serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Decode a shadow documents event from its JSON payload.
pub fn decode_documents_event(payload: &[u8]) -> Result<DocumentsEvent, DecodeError> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(DecodeError::NotObject);
    }

    serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))
}

fn decode_base64_json(encoded: &[u8]) -> Result<Value, DecodeError> {
    let text = std::str::from_utf8(encoded)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?
        .trim();

    let bytes = STANDARD
        .decode(text)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed(e.to_string()))
}
