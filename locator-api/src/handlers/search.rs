use super::parse_body;
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use locator_core::validation::SearchLocationsRequest;
use locator_lookup::DEFAULT_SEARCH_LIMIT;
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn search_locations(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    let search = match parse_body::<SearchLocationsRequest>(body).and_then(|req| req.validate()) {
        Ok(search) => search,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "locations": [],
                    "total": 0,
                    "error": "Invalid search parameters",
                    "details": e.field_errors(),
                })),
            )
                .into_response();
        }
    };

    let outcome = state
        .lookup
        .search(&search.query, search.category.as_deref(), DEFAULT_SEARCH_LIMIT, 0)
        .await;
    Json(outcome).into_response()
}
