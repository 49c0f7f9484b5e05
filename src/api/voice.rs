use crate::voice::{VoiceRequest, VoiceResponse, VoiceSkill};
use axum::{extract::State, response::Json, routing::post, Router};
use std::sync::Arc;

/// Shared state for the voice endpoint
pub struct VoiceAppState {
    pub skill: Arc<VoiceSkill>,
}

/// Create voice skill router
pub fn create_voice_router(state: Arc<VoiceAppState>) -> Router {
    Router::new()
        .route("/api/voice", post(handle_voice))
        .with_state(state)
}

/// POST /api/voice
///
/// The skill always answers with speech, including on internal failures.
async fn handle_voice(
    State(state): State<Arc<VoiceAppState>>,
    Json(request): Json<VoiceRequest>,
) -> Json<VoiceResponse> {
    Json(state.skill.handle(&request).await)
}
