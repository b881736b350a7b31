use thiserror::Error;

/// Index backend failures. These stay inside the store: `LogStore`
/// logs them and hands callers a neutral value instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Index backend not configured")]
    NotConfigured,

    #[error("Index already exists: {0}")]
    AlreadyExists(String),

    #[error("Index backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Index backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index backend returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
}
