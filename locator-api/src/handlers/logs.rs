use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use locator_store::{ListOptions, RequestContext};
use serde_json::{json, Value};
use std::sync::Arc;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn create_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let kind = body
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let context = RequestContext::from_headers(
        header(&headers, "user-agent"),
        header(&headers, "x-forwarded-for"),
        header(&headers, "x-real-ip"),
    );

    if state.logs.submit(&kind, body, context).await? {
        Ok(Json(json!({
            "success": true,
            "message": "Interaction logged successfully",
        }))
        .into_response())
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Failed to log interaction",
            })),
        )
            .into_response())
    }
}

pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(options): Query<ListOptions>,
) -> Result<Json<Value>, ApiError> {
    let listing = state.logs.list(&options).await?;
    Ok(Json(json!({
        "success": true,
        "data": listing.logs,
        "total": listing.total,
        "pagination": listing.pagination,
    })))
}

pub async fn log_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let report = state.logs.get_statistics().await;
    if report.healthy {
        Json(json!({
            "success": true,
            "healthy": true,
            "stats": report.stats,
        }))
    } else {
        Json(json!({
            "success": false,
            "message": "Elasticsearch is not available",
            "healthy": false,
            "stats": report.stats,
        }))
    }
}

pub async fn reset_logs(State(state): State<Arc<AppState>>) -> Response {
    if state.logs.reset().await {
        Json(json!({
            "success": true,
            "message": "Elasticsearch index reset successfully",
        }))
        .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Failed to reset Elasticsearch index",
            })),
        )
            .into_response()
    }
}
