// HTTP APIs: voice skill, shadow documents, audit history, administration

pub mod admin;
pub mod history;
pub mod shadow;
pub mod voice;

pub use admin::{create_admin_router, AdminAppState};
pub use history::{create_history_router, HistoryAppState};
pub use shadow::{create_shadow_router, ShadowAppState};
pub use voice::{create_voice_router, VoiceAppState};

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use serde_json::json;

/// Error body shared by every router
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

/// Create health check router
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
