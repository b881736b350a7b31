//! In-process index backend.
//!
//! Mirrors the Elasticsearch backend's query semantics closely enough for
//! local development and tests: keyword equality on `type`, inclusive
//! timestamp bounds, and token-based free-text matching over the same
//! fields the mapping marks as `text`.

use crate::backend::IndexBackend;
use crate::error::StoreError;
use crate::filter::{CountCriteria, LogFilter, LogPage};
use async_trait::async_trait;
use locator_core::{LogEntry, LogRecord};
use tokio::sync::RwLock;

/// `None` while the index does not exist.
#[derive(Default)]
pub struct MemoryIndex {
    docs: RwLock<Option<Vec<LogEntry>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Text fields covered by free-text search.
fn searchable_text(entry: &LogEntry) -> Vec<&str> {
    match &entry.record {
        LogRecord::Verifier { input, result } => vec![input.suburb.as_str(), result.message.as_str()],
        LogRecord::Source {
            search_query,
            selected_location,
        } => vec![search_query.as_str(), selected_location.location.location.as_str()],
    }
}

fn matches_term(entry: &LogEntry, term: &str) -> bool {
    let wanted: Vec<String> = tokens(term).collect();
    if wanted.is_empty() {
        return true;
    }
    searchable_text(entry)
        .into_iter()
        .flat_map(tokens)
        .any(|t| wanted.contains(&t))
}

fn matches_filter(entry: &LogEntry, filter: &LogFilter) -> bool {
    if filter.kind.is_some_and(|k| entry.kind() != k) {
        return false;
    }

    if filter.start.is_some() || filter.end.is_some() {
        let Some(at) = entry.recorded_at() else {
            return false;
        };
        if filter.start.is_some_and(|start| at < start) {
            return false;
        }
        if filter.end.is_some_and(|end| at > end) {
            return false;
        }
    }

    match filter.search_term.as_deref() {
        Some(term) => matches_term(entry, term),
        None => true,
    }
}

fn matches_criteria(entry: &LogEntry, criteria: CountCriteria) -> bool {
    match criteria {
        CountCriteria::All => true,
        CountCriteria::Kind(kind) => entry.kind() == kind,
        CountCriteria::Verification { is_valid } => matches!(
            &entry.record,
            LogRecord::Verifier { result, .. } if result.is_valid == is_valid
        ),
    }
}

#[async_trait]
impl IndexBackend for MemoryIndex {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn index_exists(&self) -> Result<bool, StoreError> {
        Ok(self.docs.read().await.is_some())
    }

    async fn create_index(&self) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.is_some() {
            return Err(StoreError::AlreadyExists("memory".into()));
        }
        *docs = Some(Vec::new());
        Ok(())
    }

    async fn delete_index(&self) -> Result<(), StoreError> {
        *self.docs.write().await = None;
        Ok(())
    }

    async fn index_document(&self, entry: &LogEntry) -> Result<(), StoreError> {
        // Writing to a missing index creates it, as Elasticsearch does.
        self.docs
            .write()
            .await
            .get_or_insert_with(Vec::new)
            .push(entry.clone());
        Ok(())
    }

    async fn search(&self, filter: &LogFilter) -> Result<LogPage, StoreError> {
        let docs = self.docs.read().await;
        let mut hits: Vec<&LogEntry> = docs
            .iter()
            .flatten()
            .filter(|e| matches_filter(e, filter))
            .collect();
        hits.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));

        let total = hits.len() as u64;
        let entries = hits
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect();
        Ok(LogPage { entries, total })
    }

    async fn count(&self, criteria: CountCriteria) -> Result<u64, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .flatten()
            .filter(|e| matches_criteria(e, criteria))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::log_entry::VerifierInput;
    use locator_core::{AustralianState, LogKind, ValidationResult};

    fn verifier(suburb: &str, valid: bool, timestamp: &str) -> LogEntry {
        let mut entry = LogEntry::new(
            LogRecord::Verifier {
                input: VerifierInput {
                    postcode: "3000".into(),
                    suburb: suburb.into(),
                    state: AustralianState::Vic,
                },
                result: ValidationResult {
                    is_valid: valid,
                    message: format!("checked {suburb}"),
                    location: None,
                },
            },
            Some("s".into()),
            None,
            None,
        );
        entry.timestamp = timestamp.into();
        entry
    }

    #[test]
    fn tokens_split_and_lowercase() {
        let t: Vec<String> = tokens("North-Melbourne, VIC").collect();
        assert_eq!(t, vec!["north", "melbourne", "vic"]);
    }

    #[test]
    fn term_matches_any_token_in_text_fields() {
        let e = verifier("North Melbourne", true, "2024-01-01T00:00:00.000Z");
        assert!(matches_term(&e, "melbourne"));
        assert!(matches_term(&e, "CHECKED"));
        assert!(!matches_term(&e, "melb"));
        assert!(!matches_term(&e, "sydney"));
    }

    #[tokio::test]
    async fn write_to_missing_index_creates_it() {
        let index = MemoryIndex::new();
        assert!(!index.index_exists().await.unwrap());
        index
            .index_document(&verifier("Carlton", true, "2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert!(index.index_exists().await.unwrap());
    }

    #[tokio::test]
    async fn create_twice_reports_already_exists() {
        let index = MemoryIndex::new();
        index.create_index().await.unwrap();
        assert!(matches!(
            index.create_index().await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn search_orders_newest_first_and_pages() {
        let index = MemoryIndex::new();
        for (i, ts) in [
            "2024-01-02T00:00:00.000Z",
            "2024-01-03T00:00:00.000Z",
            "2024-01-01T00:00:00.000Z",
        ]
        .iter()
        .enumerate()
        {
            index
                .index_document(&verifier(&format!("Suburb{i}"), true, ts))
                .await
                .unwrap();
        }

        let page = index
            .search(&LogFilter {
                limit: 2,
                ..LogFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].timestamp, "2024-01-03T00:00:00.000Z");
        assert_eq!(page.entries[1].timestamp, "2024-01-02T00:00:00.000Z");
    }

    #[tokio::test]
    async fn counts_split_verifications_by_outcome() {
        let index = MemoryIndex::new();
        index.index_document(&verifier("A", true, "2024-01-01T00:00:00.000Z")).await.unwrap();
        index.index_document(&verifier("B", false, "2024-01-01T00:00:00.000Z")).await.unwrap();
        index.index_document(&verifier("C", false, "2024-01-01T00:00:00.000Z")).await.unwrap();

        assert_eq!(index.count(CountCriteria::All).await.unwrap(), 3);
        assert_eq!(index.count(CountCriteria::Kind(LogKind::Source)).await.unwrap(), 0);
        assert_eq!(
            index.count(CountCriteria::Verification { is_valid: false }).await.unwrap(),
            2
        );
    }
}
