//! Boundary between the HTTP surface and the [`LogStore`].
//!
//! Turns loosely shaped log submissions and list parameters into typed
//! store calls, and rejects what cannot be typed as caller errors.

use crate::filter::{DEFAULT_LIMIT, LogFilter, LogStatistics};
use crate::store::LogStore;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use locator_core::location::SelectedLocation;
use locator_core::log_entry::VerifierInput;
use locator_core::{LocatorError, LogEntry, LogKind, LogRecord, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;

/// Who sent a log submission, as far as the request headers tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl RequestContext {
    /// Client IP from the first `X-Forwarded-For` hop, else `X-Real-IP`.
    /// Values that are not IP addresses are dropped.
    pub fn from_headers(
        user_agent: Option<&str>,
        forwarded_for: Option<&str>,
        real_ip: Option<&str>,
    ) -> Self {
        let ip_address = forwarded_for
            .and_then(|v| v.split(',').next())
            .or(real_ip)
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
            .map(|ip| ip.to_string());

        Self {
            user_agent: user_agent.map(str::to_string).filter(|ua| !ua.is_empty()),
            ip_address,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifierSubmission {
    input: VerifierInput,
    result: ValidationResult,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceSubmission {
    search_query: String,
    selected_location: SelectedLocation,
    #[serde(default)]
    session_id: Option<String>,
}

/// `GET /logs` query parameters, as received. Every value is kept as
/// text; empty means "not given".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogListing {
    pub logs: Vec<LogEntry>,
    pub total: u64,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatisticsReport {
    pub healthy: bool,
    pub stats: LogStatistics,
}

/// Log ingestion and query service.
#[derive(Clone)]
pub struct LogService {
    store: Arc<LogStore>,
}

impl LogService {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }

    /// Record one interaction of the given `kind` (`verifier` or `source`).
    ///
    /// `Err` is reserved for caller mistakes; a backend that refuses the
    /// write yields `Ok(false)`.
    pub async fn submit(
        &self,
        kind: &str,
        payload: Value,
        context: RequestContext,
    ) -> Result<bool, LocatorError> {
        let (record, session_id) = match kind.parse::<LogKind>()? {
            LogKind::Verifier => {
                let s: VerifierSubmission = serde_json::from_value(payload)
                    .map_err(|e| LocatorError::field("payload", e.to_string()))?;
                (
                    LogRecord::Verifier {
                        input: s.input,
                        result: s.result,
                    },
                    s.session_id,
                )
            }
            LogKind::Source => {
                let s: SourceSubmission = serde_json::from_value(payload)
                    .map_err(|e| LocatorError::field("payload", e.to_string()))?;
                (
                    LogRecord::Source {
                        search_query: s.search_query,
                        selected_location: s.selected_location,
                    },
                    s.session_id,
                )
            }
        };

        let entry = LogEntry::new(record, session_id, context.user_agent, context.ip_address);
        self.store.ensure_ready().await;
        Ok(self.store.append(&entry).await)
    }

    /// One page of logs plus pagination metadata.
    pub async fn list(&self, options: &ListOptions) -> Result<LogListing, LocatorError> {
        let filter = LogFilter {
            kind: options
                .kind
                .as_deref()
                .filter(|k| !k.is_empty())
                .map(str::parse::<LogKind>)
                .transpose()?,
            start: options
                .start_date
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| parse_bound("startDate", d, Bound::Start))
                .transpose()?,
            end: options
                .end_date
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| parse_bound("endDate", d, Bound::End))
                .transpose()?,
            search_term: options.search.clone().filter(|s| !s.trim().is_empty()),
            limit: parse_count("limit", options.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT),
            offset: parse_count("offset", options.offset.as_deref())?.unwrap_or(0),
        };

        self.store.ensure_ready().await;
        let page = self.store.query(&filter).await;
        let has_more = page.total > (filter.offset as u64).saturating_add(filter.limit as u64);

        Ok(LogListing {
            logs: page.entries,
            total: page.total,
            pagination: Pagination {
                limit: filter.limit,
                offset: filter.offset,
                has_more,
            },
        })
    }

    /// Statistics, or zeroes with `healthy = false` when the backend is
    /// down. The count queries are skipped in that case.
    pub async fn get_statistics(&self) -> StatisticsReport {
        if !self.store.health_check().await {
            return StatisticsReport {
                healthy: false,
                stats: LogStatistics::default(),
            };
        }
        StatisticsReport {
            healthy: true,
            stats: self.store.statistics().await,
        }
    }

    pub async fn reset(&self) -> bool {
        self.store.reset_index().await
    }
}

/// Non-negative integer parameter; blank counts as absent.
fn parse_count(field: &str, raw: Option<&str>) -> Result<Option<usize>, LocatorError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| LocatorError::field(field, "Expected a non-negative integer")),
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// RFC 3339 timestamp, or a bare date covering the whole day.
fn parse_bound(field: &str, raw: &str, bound: Bound) -> Result<DateTime<Utc>, LocatorError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        LocatorError::field(field, "Expected an RFC 3339 timestamp or a YYYY-MM-DD date")
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::from_hms_opt(0, 0, 0),
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
    }
    .ok_or_else(|| LocatorError::Internal("invalid day boundary".into()))?;
    Ok(date.and_time(time).and_utc())
}
