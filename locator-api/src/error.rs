use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use locator_core::LocatorError;
use serde_json::json;
use tracing::error;

/// A [`LocatorError`] on its way out of a `/logs` handler.
///
/// Renders as `{success: false, error, details?}` with the status from
/// [`LocatorError::status_code`]. `details` only carries field errors;
/// internal causes stay in the server log.
#[derive(Debug)]
pub struct ApiError(pub LocatorError);

impl From<LocatorError> for ApiError {
    fn from(err: LocatorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            LocatorError::InvalidLogType(_) => json!({
                "success": false,
                "error": "Invalid log type. Must be \"verifier\" or \"source\"",
            }),
            LocatorError::Validation(errors) => json!({
                "success": false,
                "error": "Invalid request",
                "details": errors,
            }),
            other => {
                error!(error = %other, "Request failed");
                json!({
                    "success": false,
                    "error": "Internal server error",
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_log_type_is_bad_request() {
        let resp = ApiError(LocatorError::InvalidLogType("x".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_error_hides_its_cause() {
        let resp = ApiError(LocatorError::Internal("invalid day boundary".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "Internal server error" }));
    }
}
