use crate::client::LocalitySource;
use crate::error::LookupError;
use locator_core::validation::VerifyAddress;
use locator_core::{Location, ValidationResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Results returned by a search when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const VALID_MESSAGE: &str = "The postcode, suburb, and state input are valid.";
const UNAVAILABLE_MESSAGE: &str =
    "Unable to verify address. Please try with different details or try again later.";
const HEALTHY_MESSAGE: &str = "Australia Post API is healthy";
/// A query the upstream always answers (Sydney CBD).
const HEALTH_PROBE_QUERY: &str = "2000";

/// One page of search results; `total` counts every match before the
/// page window was applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub locations: Vec<Location>,
    pub total: usize,
}

/// Address verification and location search on top of a [`LocalitySource`].
///
/// Upstream failures never escape `verify` or `search`; they become a
/// negative result or an empty page.
#[derive(Clone)]
pub struct AddressLookup {
    source: Arc<dyn LocalitySource>,
}

impl AddressLookup {
    pub fn new(source: Arc<dyn LocalitySource>) -> Self {
        Self { source }
    }

    pub async fn verify(&self, input: &VerifyAddress) -> ValidationResult {
        let localities = match self.source.find(&input.suburb, Some(input.state)).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, suburb = %input.suburb, state = %input.state, "Address verification failed upstream");
                return ValidationResult::invalid(UNAVAILABLE_MESSAGE);
            }
        };

        if localities.is_empty() {
            return ValidationResult::invalid(format!(
                "The suburb {} does not exist in the state {} ({}).",
                input.suburb,
                input.state.display_name(),
                input.state.code()
            ));
        }

        let wanted = input.postcode.parse::<u32>().ok();
        match localities
            .into_iter()
            .find(|loc| Some(loc.postcode) == wanted)
        {
            Some(location) => ValidationResult::valid(VALID_MESSAGE, location),
            None => ValidationResult::invalid(format!(
                "The postcode {} does not match the suburb {}.",
                input.postcode, input.suburb
            )),
        }
    }

    /// Search localities by free text. A `category` narrows the matches
    /// before paging; `None` or an empty string keeps everything.
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> SearchOutcome {
        let localities = match self.source.find(query, None).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, query, "Location search failed upstream");
                return SearchOutcome::default();
            }
        };

        let matched: Vec<Location> = match category.filter(|c| !c.is_empty()) {
            Some(wanted) => localities
                .into_iter()
                .filter(|loc| loc.category.as_deref() == Some(wanted))
                .collect(),
            None => localities,
        };

        let total = matched.len();
        let locations = matched.into_iter().skip(offset).take(limit).collect();
        SearchOutcome { locations, total }
    }

    /// Probe the upstream with a known-good query.
    pub async fn health_check(&self) -> Result<String, LookupError> {
        match self.source.find(HEALTH_PROBE_QUERY, None).await {
            Ok(_) => {
                info!("Australia Post health check passed");
                Ok(HEALTHY_MESSAGE.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Australia Post health check failed");
                Err(e)
            }
        }
    }
}
