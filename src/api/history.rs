use super::ErrorResponse;
use crate::audit::{AuditRecord, SqliteAuditStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::error;

/// Shared state for the audit history API
pub struct HistoryAppState {
    pub audit: Arc<SqliteAuditStore>,
}

/// Create audit history router
pub fn create_history_router(state: Arc<HistoryAppState>) -> Router {
    Router::new()
        .route("/api/audit/:actuator_id", get(get_history))
        .with_state(state)
}

/// GET /api/audit/:actuator_id
///
/// Returns every recorded state change for one actuator
/// (`{thing}_{attribute}`), oldest first. Unknown actuators yield `[]`.
async fn get_history(
    State(state): State<Arc<HistoryAppState>>,
    Path(actuator_id): Path<String>,
) -> Response {
    match state.audit.history(&actuator_id) {
        Ok(records) => Json::<Vec<AuditRecord>>(records).into_response(),
        Err(e) => {
            error!(actuator_id = %actuator_id, error = %e, "Failed to read audit history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to read audit history".to_string(),
                }),
            )
                .into_response()
        }
    }
}
