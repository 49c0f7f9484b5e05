use super::ErrorResponse;
use crate::credentials::SqliteCredentialRegistry;
use crate::devices::SqliteDeviceMappingStore;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// State for the admin API.
#[derive(Clone)]
pub struct AdminAppState {
    pub registry: Arc<SqliteCredentialRegistry>,
    pub devices: Arc<SqliteDeviceMappingStore>,
    /// Required bearer token for every admin route. None = unrestricted.
    pub admin_token: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterCardRequest {
    pub card_uid: String,
    pub label: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignDeviceRequest {
    pub thing_name: String,
}

#[derive(Serialize)]
struct AssignmentResponse {
    user_id: String,
    thing_name: String,
}

pub fn create_admin_router(state: AdminAppState) -> Router {
    Router::new()
        .route("/api/credentials", get(list_cards).post(register_card))
        .route("/api/credentials/:card_uid", delete(revoke_card))
        .route(
            "/api/users/:user_id/device",
            put(assign_device).delete(remove_device),
        )
        .with_state(Arc::new(state))
}

/// GET /api/credentials - every registered card.
async fn list_cards(State(state): State<Arc<AdminAppState>>, headers: HeaderMap) -> Response {
    if !validate_admin_token(&headers, &state.admin_token) {
        return AdminError::Unauthorized.into_response();
    }

    match state.registry.list() {
        Ok(cards) => Json(cards).into_response(),
        Err(e) => AdminError::Storage(e).into_response(),
    }
}

/// POST /api/credentials - register (or relabel) a card.
async fn register_card(
    State(state): State<Arc<AdminAppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterCardRequest>,
) -> Response {
    if !validate_admin_token(&headers, &state.admin_token) {
        return AdminError::Unauthorized.into_response();
    }

    let card_uid = request.card_uid.trim();
    if card_uid.is_empty() {
        return AdminError::BadRequest("card_uid must not be empty").into_response();
    }

    if let Err(e) = state.registry.register(card_uid, request.label.as_deref()) {
        return AdminError::Storage(e).into_response();
    }

    info!(card_uid = %card_uid, "Card registered");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "card_uid": card_uid,
            "label": request.label,
        })),
    )
        .into_response()
}

/// DELETE /api/credentials/:card_uid - revoke a card.
async fn revoke_card(
    State(state): State<Arc<AdminAppState>>,
    headers: HeaderMap,
    Path(card_uid): Path<String>,
) -> Response {
    if !validate_admin_token(&headers, &state.admin_token) {
        return AdminError::Unauthorized.into_response();
    }

    match state.registry.revoke(&card_uid) {
        Ok(true) => {
            info!(card_uid = %card_uid, "Card revoked");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => AdminError::NotFound("Card not registered").into_response(),
        Err(e) => AdminError::Storage(e).into_response(),
    }
}

/// PUT /api/users/:user_id/device - assign the device a voice user controls.
async fn assign_device(
    State(state): State<Arc<AdminAppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<AssignDeviceRequest>,
) -> Response {
    if !validate_admin_token(&headers, &state.admin_token) {
        return AdminError::Unauthorized.into_response();
    }

    let thing_name = request.thing_name.trim();
    if thing_name.is_empty() {
        return AdminError::BadRequest("thing_name must not be empty").into_response();
    }

    if let Err(e) = state.devices.assign(&user_id, thing_name) {
        return AdminError::Storage(e).into_response();
    }

    Json(AssignmentResponse {
        user_id,
        thing_name: thing_name.to_string(),
    })
    .into_response()
}

/// DELETE /api/users/:user_id/device - drop a user's assignment.
async fn remove_device(
    State(state): State<Arc<AdminAppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response {
    if !validate_admin_token(&headers, &state.admin_token) {
        return AdminError::Unauthorized.into_response();
    }

    match state.devices.remove(&user_id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => AdminError::NotFound("User has no device").into_response(),
        Err(e) => AdminError::Storage(e).into_response(),
    }
}

#[derive(Debug)]
enum AdminError {
    Unauthorized,
    BadRequest(&'static str),
    NotFound(&'static str),
    Storage(anyhow::Error),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AdminError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AdminError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            AdminError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AdminError::Storage(e) => {
                error!(error = ?e, "Admin storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

/// Returns true if the bearer token in `Authorization` matches the expected admin token.
/// Returns true (no restriction) when `expected` is None.
fn validate_admin_token(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let Some(expected_token) = expected else {
        return true;
    };

    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected_token)
}
