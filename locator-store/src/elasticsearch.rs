use crate::backend::IndexBackend;
use crate::error::StoreError;
use crate::filter::{CountCriteria, LogFilter, LogPage};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use locator_core::config::ElasticsearchConfig;
use locator_core::{LogEntry, LogKind};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Fields searched by a free-text term.
pub const SEARCH_FIELDS: [&str; 4] = [
    "input.suburb",
    "result.message",
    "searchQuery",
    "selectedLocation.location",
];

/// Elasticsearch index over its REST API.
pub struct ElasticsearchIndex {
    http: reqwest::Client,
    node: String,
    index: String,
    api_key: Option<String>,
}

impl ElasticsearchIndex {
    /// Build the client. An empty node URL means logging is not configured.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, StoreError> {
        let node = config.node.trim().trim_end_matches('/');
        if node.is_empty() {
            return Err(StoreError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            node: node.to_string(),
            index: config.index.clone(),
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.node, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("ApiKey {key}")),
            None => builder,
        }
    }

    fn index_path(&self, suffix: &str) -> String {
        format!("{}{}", self.index, suffix)
    }
}

async fn ensure_success(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl IndexBackend for ElasticsearchIndex {
    async fn ping(&self) -> Result<(), StoreError> {
        let resp = self.request(Method::HEAD, "/").send().await?;
        ensure_success(resp).await.map(|_| ())
    }

    async fn index_exists(&self) -> Result<bool, StoreError> {
        let resp = self.request(Method::HEAD, &self.index).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => ensure_success(resp).await.map(|_| true),
        }
    }

    async fn create_index(&self) -> Result<(), StoreError> {
        let resp = self
            .request(Method::PUT, &self.index)
            .json(&json!({ "mappings": mappings() }))
            .send()
            .await?;

        match ensure_success(resp).await {
            Ok(_) => Ok(()),
            Err(StoreError::Status { status: 400, body })
                if error_type(&body).as_deref() == Some("resource_already_exists_exception") =>
            {
                Err(StoreError::AlreadyExists(self.index.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_index(&self) -> Result<(), StoreError> {
        let resp = self.request(Method::DELETE, &self.index).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(()),
            _ => ensure_success(resp).await.map(|_| ()),
        }
    }

    async fn index_document(&self, entry: &LogEntry) -> Result<(), StoreError> {
        let resp = self
            .request(Method::POST, &self.index_path("/_doc"))
            .json(entry)
            .send()
            .await?;
        ensure_success(resp).await?;
        debug!(index = %self.index, kind = %entry.kind(), "Log document indexed");
        Ok(())
    }

    async fn search(&self, filter: &LogFilter) -> Result<LogPage, StoreError> {
        let resp = self
            .request(Method::POST, &self.index_path("/_search"))
            .json(&search_body(filter))
            .send()
            .await?;
        let bytes = ensure_success(resp).await?.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;

        let entries = parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| match serde_json::from_value::<LogEntry>(hit.source) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable log document");
                    None
                }
            })
            .collect();

        Ok(LogPage {
            entries,
            total: parsed.hits.total.value(),
        })
    }

    async fn count(&self, criteria: CountCriteria) -> Result<u64, StoreError> {
        let resp = self
            .request(Method::POST, &self.index_path("/_count"))
            .json(&count_body(criteria))
            .send()
            .await?;
        let bytes = ensure_success(resp).await?.bytes().await?;
        let parsed: CountResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.count)
    }
}

// ── Request bodies ────────────────────────────────────────────

/// Field mapping the log index is created with.
pub fn mappings() -> Value {
    json!({
        "properties": {
            "type": { "type": "keyword" },
            "timestamp": { "type": "date" },
            "sessionId": { "type": "keyword" },
            "input": {
                "properties": {
                    "postcode": { "type": "keyword" },
                    "suburb": { "type": "text" },
                    "state": { "type": "keyword" }
                }
            },
            "result": {
                "properties": {
                    "isValid": { "type": "boolean" },
                    "message": { "type": "text" }
                }
            },
            "searchQuery": { "type": "text" },
            "selectedLocation": {
                "properties": {
                    "location": { "type": "text" },
                    "state": { "type": "keyword" },
                    "postcode": { "type": "integer" },
                    "coordinates": { "type": "geo_point" },
                    "latitude": { "type": "float" },
                    "longitude": { "type": "float" },
                    "category": { "type": "keyword" }
                }
            },
            "userAgent": { "type": "text" },
            "ipAddress": { "type": "ip" }
        }
    })
}

fn format_bound(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn kind_term(kind: LogKind) -> Value {
    json!({ "term": { "type": kind.as_str() } })
}

fn bool_must(clauses: Vec<Value>) -> Value {
    if clauses.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "must": clauses } })
    }
}

pub(crate) fn search_body(filter: &LogFilter) -> Value {
    let mut must = Vec::new();

    if let Some(kind) = filter.kind {
        must.push(kind_term(kind));
    }

    if filter.start.is_some() || filter.end.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(start) = &filter.start {
            range.insert("gte".into(), Value::String(format_bound(start)));
        }
        if let Some(end) = &filter.end {
            range.insert("lte".into(), Value::String(format_bound(end)));
        }
        must.push(json!({ "range": { "timestamp": range } }));
    }

    if let Some(term) = filter.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
        must.push(json!({
            "multi_match": { "query": term, "fields": SEARCH_FIELDS }
        }));
    }

    json!({
        "query": bool_must(must),
        "sort": [{ "timestamp": { "order": "desc" } }],
        "size": filter.limit,
        "from": filter.offset,
        "track_total_hits": true
    })
}

pub(crate) fn count_body(criteria: CountCriteria) -> Value {
    let must = match criteria {
        CountCriteria::All => Vec::new(),
        CountCriteria::Kind(kind) => vec![kind_term(kind)],
        CountCriteria::Verification { is_valid } => vec![
            kind_term(LogKind::Verifier),
            json!({ "term": { "result.isValid": is_valid } }),
        ],
    };
    json!({ "query": bool_must(must) })
}

fn error_type(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["type"].as_str().map(str::to_string)
}

// ── Response bodies ───────────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    total: HitTotal,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is a bare number on old clusters, `{value, relation}` on new ones.
#[derive(Deserialize)]
#[serde(untagged)]
enum HitTotal {
    Count(u64),
    Detailed { value: u64 },
}

impl HitTotal {
    fn value(&self) -> u64 {
        match self {
            HitTotal::Count(n) => *n,
            HitTotal::Detailed { value } => *value,
        }
    }
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Value,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}
