use serde::Serialize;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the locator.
#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Invalid input: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid log type: {0}")]
    InvalidLogType(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal: {0}")]
    Internal(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl LocatorError {
    /// Shorthand for a validation error on one field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        LocatorError::Validation(vec![FieldError::new(field, message)])
    }

    /// Map to HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            LocatorError::Validation(_) => 400,
            LocatorError::InvalidLogType(_) => 400,
            LocatorError::Upstream(_) => 502,
            _ => 500,
        }
    }

    /// Structured field errors, empty for non-validation errors.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            LocatorError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
