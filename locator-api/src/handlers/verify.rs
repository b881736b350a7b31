use super::parse_body;
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use locator_core::validation::VerifyAddressRequest;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub async fn verify_address(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    let input = match parse_body::<VerifyAddressRequest>(body).and_then(|req| req.validate()) {
        Ok(input) => input,
        Err(e) => {
            debug!(error = %e, "Rejected verification request");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "isValid": false,
                    "message": "Invalid input data",
                    "errors": e.field_errors(),
                })),
            )
                .into_response();
        }
    };

    Json(state.lookup.verify(&input).await).into_response()
}
