pub mod health;
pub mod logs;
pub mod search;
pub mod verify;

use locator_core::LocatorError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a JSON body, reporting a shape mismatch as a field error
/// instead of an extractor rejection.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, LocatorError> {
    serde_json::from_value(body).map_err(|e| LocatorError::field("body", e.to_string()))
}
