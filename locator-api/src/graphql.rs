//! GraphQL surface over the same lookup operations as the REST routes.
//!
//! `POST /graphql` takes a standard `{query, operationName, variables}`
//! body. `GET /graphql` runs a query passed as URL parameters, or serves
//! GraphiQL when no query is given.

use crate::server::AppState;
use async_graphql::http::GraphiQLSource;
use async_graphql::{
    EmptyMutation, EmptySubscription, ErrorExtensions, InputObject, Object, Schema, SimpleObject,
    Variables,
};
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Json, Response},
};
use locator_core::validation::{SearchLocationsRequest, VerifyAddressRequest};
use locator_core::{LocatorError, Location, ValidationResult};
use locator_lookup::{AddressLookup, DEFAULT_SEARCH_LIMIT};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

pub type LocatorSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(lookup: AddressLookup) -> LocatorSchema {
    Schema::build(QueryRoot { lookup }, EmptyMutation, EmptySubscription).finish()
}

#[derive(InputObject)]
pub struct VerifyAddressInput {
    pub postcode: String,
    pub suburb: String,
    pub state: String,
}

#[derive(InputObject)]
pub struct SearchLocationsInput {
    pub query: String,
    pub category: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(SimpleObject)]
pub struct SearchResult {
    pub locations: Vec<Location>,
    pub total: usize,
    pub query: String,
}

pub struct QueryRoot {
    lookup: AddressLookup,
}

fn bad_input(err: LocatorError) -> async_graphql::Error {
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
}

/// `None` and zero fall back to `default`; negatives are rejected.
fn window(name: &str, value: Option<i32>, default: usize) -> async_graphql::Result<usize> {
    match value {
        None | Some(0) => Ok(default),
        Some(n) => usize::try_from(n)
            .map_err(|_| bad_input(LocatorError::field(name, "Must not be negative"))),
    }
}

#[Object]
impl QueryRoot {
    async fn verify_address(
        &self,
        input: VerifyAddressInput,
    ) -> async_graphql::Result<ValidationResult> {
        let request = VerifyAddressRequest {
            postcode: input.postcode,
            suburb: input.suburb,
            state: input.state,
        };
        let verified = request.validate().map_err(bad_input)?;
        Ok(self.lookup.verify(&verified).await)
    }

    async fn search_locations(
        &self,
        input: SearchLocationsInput,
    ) -> async_graphql::Result<SearchResult> {
        let limit = window("limit", input.limit, DEFAULT_SEARCH_LIMIT)?;
        let offset = window("offset", input.offset, 0)?;
        let request = SearchLocationsRequest {
            query: input.query,
            category: input.category,
        };
        let search = request.validate().map_err(bad_input)?;

        let outcome = self
            .lookup
            .search(&search.query, search.category.as_deref(), limit, offset)
            .await;
        Ok(SearchResult {
            locations: outcome.locations,
            total: outcome.total,
            query: search.query,
        })
    }

    async fn health_check(&self) -> async_graphql::Result<String> {
        self.lookup.health_check().await.map_err(|e| {
            let err = LocatorError::from(e);
            async_graphql::Error::new(err.to_string())
                .extend_with(|_, ext| ext.set("code", "INTERNAL_ERROR"))
        })
    }
}

pub async fn graphql_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLParams {
    query: Option<String>,
    operation_name: Option<String>,
    /// JSON-encoded variables object.
    variables: Option<String>,
}

pub async fn graphql_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphQLParams>,
) -> Response {
    let Some(query) = params.query else {
        return Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response();
    };

    let mut request = async_graphql::Request::new(query);
    if let Some(name) = params.operation_name {
        request = request.operation_name(name);
    }
    if let Some(raw) = params.variables.filter(|v| !v.is_empty()) {
        match serde_json::from_str(&raw) {
            Ok(value) => request = request.variables(Variables::from_json(value)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed GraphQL variables");
            }
        }
    }

    Json(state.schema.execute(request).await).into_response()
}
