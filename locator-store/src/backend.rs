use crate::error::StoreError;
use crate::filter::{CountCriteria, LogFilter, LogPage};
use async_trait::async_trait;
use locator_core::LogEntry;

/// Document index holding interaction logs.
///
/// Implementations own exactly one named index. Every method is a single
/// request with no retries.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Reachability of the backend itself, regardless of the index.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn index_exists(&self) -> Result<bool, StoreError>;

    /// Create the index with the log mapping. Fails with
    /// [`StoreError::AlreadyExists`] if another writer got there first.
    async fn create_index(&self) -> Result<(), StoreError>;

    async fn delete_index(&self) -> Result<(), StoreError>;

    async fn index_document(&self, entry: &LogEntry) -> Result<(), StoreError>;

    /// Matching entries, newest first, windowed by `limit`/`offset`.
    async fn search(&self, filter: &LogFilter) -> Result<LogPage, StoreError>;

    async fn count(&self, criteria: CountCriteria) -> Result<u64, StoreError>;
}
