use super::ErrorResponse;
use crate::shadow::{MemoryShadowService, ShadowDocument, Snapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared state for the shadow API
pub struct ShadowAppState {
    pub shadow: Arc<MemoryShadowService>,
}

/// Create shadow API router
pub fn create_shadow_router(state: Arc<ShadowAppState>) -> Router {
    Router::new()
        .route("/api/shadow/:thing", get(get_document))
        .route("/api/shadow/:thing/reported", post(post_reported))
        .with_state(state)
}

/// GET /api/shadow/:thing - Current shadow document
async fn get_document(
    State(state): State<Arc<ShadowAppState>>,
    Path(thing): Path<String>,
) -> Result<Json<ShadowDocument>, ShadowError> {
    state
        .shadow
        .get_document(&thing)
        .map(Json)
        .ok_or(ShadowError::NotFound)
}

/// POST /api/shadow/:thing/reported - Merge reported state
///
/// Same path as a device publishing over NATS: the merge emits a documents
/// event, so changed attributes reach the audit log.
async fn post_reported(
    State(state): State<Arc<ShadowAppState>>,
    Path(thing): Path<String>,
    Json(reported): Json<Snapshot>,
) -> Result<Json<ShadowDocument>, ShadowError> {
    if reported.is_empty() {
        return Err(ShadowError::EmptyReport);
    }

    let event = state.shadow.report(&thing, reported);
    event.current.map(Json).ok_or(ShadowError::NotFound)
}

#[derive(Debug)]
enum ShadowError {
    NotFound,
    EmptyReport,
}

impl IntoResponse for ShadowError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ShadowError::NotFound => (StatusCode::NOT_FOUND, "Thing not found"),
            ShadowError::EmptyReport => {
                (StatusCode::BAD_REQUEST, "Reported state must not be empty")
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_state() -> Arc<ShadowAppState> {
        Arc::new(ShadowAppState {
            shadow: Arc::new(MemoryShadowService::new()),
        })
    }

    #[tokio::test]
    async fn test_get_unknown_thing() {
        let result = get_document(State(create_test_state()), Path("MiCasa".to_string())).await;
        assert!(matches!(result, Err(ShadowError::NotFound)));
    }

    #[tokio::test]
    async fn test_post_reported_then_get() {
        let state = create_test_state();
        let reported = json!({"luz_sala": "ON"}).as_object().cloned().unwrap();

        let posted = post_reported(State(state.clone()), Path("MiCasa".to_string()), Json(reported))
            .await
            .unwrap();
        assert_eq!(posted.0.version, 1);

        let fetched = get_document(State(state), Path("MiCasa".to_string()))
            .await
            .unwrap();
        assert_eq!(fetched.0.state.reported.get("luz_sala"), Some(&json!("ON")));
    }

    #[tokio::test]
    async fn test_post_empty_report() {
        let result = post_reported(
            State(create_test_state()),
            Path("MiCasa".to_string()),
            Json(Snapshot::new()),
        )
        .await;
        assert!(matches!(result, Err(ShadowError::EmptyReport)));
    }
}
