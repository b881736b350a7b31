use locator_core::LocatorError;
use thiserror::Error;

/// Failures talking to the postcode lookup service.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Australia Post API error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Australia Post API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Australia Post API returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<LookupError> for LocatorError {
    fn from(err: LookupError) -> Self {
        LocatorError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_upstream_locator_error() {
        let err = LocatorError::from(LookupError::Status {
            status: 401,
            reason: "Unauthorized".into(),
        });
        assert!(matches!(err, LocatorError::Upstream(_)));
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "Upstream error: Australia Post API error: 401 Unauthorized");
    }
}
