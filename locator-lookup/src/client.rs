use crate::error::LookupError;
use async_trait::async_trait;
use locator_core::config::AusPostConfig;
use locator_core::{AustralianState, Location};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

const POSTCODE_SEARCH_PATH: &str = "/postcode/search.json";

/// Anything that can answer "which localities match this text".
#[async_trait]
pub trait LocalitySource: Send + Sync {
    /// Localities whose name or postcode matches `query`, optionally
    /// restricted to one state.
    async fn find(
        &self,
        query: &str,
        state: Option<AustralianState>,
    ) -> Result<Vec<Location>, LookupError>;
}

/// HTTP client for the Australia Post postcode search API.
pub struct AusPostClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AusPostClient {
    pub fn new(config: &AusPostConfig) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl LocalitySource for AusPostClient {
    async fn find(
        &self,
        query: &str,
        state: Option<AustralianState>,
    ) -> Result<Vec<Location>, LookupError> {
        let url = format!("{}{}", self.base_url, POSTCODE_SEARCH_PATH);
        let mut params = vec![("q", query.to_string())];
        if let Some(state) = state {
            params.push(("state", state.code().to_string()));
        }

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = resp.bytes().await?;
        let parsed: PostcodeSearchResponse = serde_json::from_slice(&body)?;
        debug!(query, count = parsed.localities.len(), "Postcode search answered");
        Ok(parsed.localities)
    }
}

/// Body of `/postcode/search.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct PostcodeSearchResponse {
    #[serde(default, deserialize_with = "localities_as_list")]
    pub(crate) localities: Vec<Location>,
}

/// `localities.locality` arrives as an array, a lone object, or not at
/// all (`"localities": ""` when nothing matched). Normalise to a list.
fn localities_as_list<'de, D>(deserializer: D) -> Result<Vec<Location>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let locality = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(mut map)) => map.remove("locality"),
        _ => None,
    };

    match locality {
        Some(items @ Value::Array(_)) => serde_json::from_value(items).map_err(D::Error::custom),
        Some(item @ Value::Object(_)) => serde_json::from_value::<Location>(item)
            .map(|loc| vec![loc])
            .map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}
