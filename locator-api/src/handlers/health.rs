use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// Upstream lookup health. Answers with a bare JSON string on success.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match state.lookup.health_check().await {
        Ok(message) => Json(message).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Health check failed" })),
        )
            .into_response(),
    }
}
