use chrono::{DateTime, Utc};
use locator_core::{LogEntry, LogKind};
use serde::Serialize;

/// Page size used when a caller does not give one.
pub const DEFAULT_LIMIT: usize = 50;

/// Log query parameters. Every criterion is optional; present ones are
/// combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFilter {
    pub kind: Option<LogKind>,
    /// Inclusive lower bound on `timestamp`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`.
    pub end: Option<DateTime<Utc>>,
    /// Free text matched against suburb, message, search query and
    /// selected location name.
    pub search_term: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            kind: None,
            start: None,
            end: None,
            search_term: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One window of query results; `total` ignores the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub total: u64,
}

/// The five counts behind [`LogStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCriteria {
    All,
    Kind(LogKind),
    /// `verifier` entries with the given `result.isValid`.
    Verification { is_valid: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStatistics {
    pub total_logs: u64,
    pub verifier_logs: u64,
    pub source_logs: u64,
    pub successful_verifications: u64,
    pub failed_verifications: u64,
}
