//! Interaction log records.
//!
//! A [`LogEntry`] is written once, when a verification completes or a
//! search result is selected, and never updated afterwards. The variant
//! payload lives in [`LogRecord`], so a `verifier` record cannot carry
//! `source` fields and vice versa.

use crate::error::LocatorError;
use crate::location::{SelectedLocation, ValidationResult};
use crate::session::session_id_or_generate;
use crate::state::AustralianState;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant of a [`LogRecord`], as stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Verifier,
    Source,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Verifier => "verifier",
            LogKind::Source => "source",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verifier" => Ok(LogKind::Verifier),
            "source" => Ok(LogKind::Source),
            other => Err(LocatorError::InvalidLogType(other.to_string())),
        }
    }
}

/// The form values a verification was run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierInput {
    pub postcode: String,
    pub suburb: String,
    pub state: AustralianState,
}

/// Variant payload of a log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogRecord {
    Verifier {
        input: VerifierInput,
        result: ValidationResult,
    },
    #[serde(rename_all = "camelCase")]
    Source {
        search_query: String,
        selected_location: SelectedLocation,
    },
}

impl LogRecord {
    pub fn kind(&self) -> LogKind {
        match self {
            LogRecord::Verifier { .. } => LogKind::Verifier,
            LogRecord::Source { .. } => LogKind::Source,
        }
    }
}

/// One persisted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(flatten)]
    pub record: LogRecord,
}

impl LogEntry {
    /// Stamp a record with the current time and a session id.
    pub fn new(
        record: LogRecord,
        session_id: Option<String>,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            session_id: session_id_or_generate(session_id),
            user_agent,
            ip_address,
            record,
        }
    }

    pub fn kind(&self) -> LogKind {
        self.record.kind()
    }

    /// Parsed timestamp; `None` if the stored string is not RFC 3339.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
