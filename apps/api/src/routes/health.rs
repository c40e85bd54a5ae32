use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Returns a status object with the active AI backend and service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "OK",
        "message": "AI Cover Letter Generator API is running",
        "aiService": state.llm.backend(),
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at.to_rfc3339(),
        "uptimeSeconds": uptime
    }))
}
