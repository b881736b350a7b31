use crate::graphql::{self, LocatorSchema};
use crate::handlers;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use locator_core::config::ServerConfig;
use locator_lookup::AddressLookup;
use locator_store::LogService;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for every handler.
pub struct AppState {
    pub lookup: AddressLookup,
    pub logs: LogService,
    pub schema: LocatorSchema,
}

impl AppState {
    pub fn new(lookup: AddressLookup, logs: LogService) -> Self {
        let schema = graphql::build_schema(lookup.clone());
        Self {
            lookup,
            logs,
            schema,
        }
    }
}

/// Build the axum router with all REST and GraphQL routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Lookup
        .route("/verify-address", post(handlers::verify::verify_address))
        .route("/search-locations", post(handlers::search::search_locations))
        .route("/health-check", get(handlers::health::health_check))
        // Interaction logs
        .route(
            "/logs",
            get(handlers::logs::list_logs)
                .post(handlers::logs::create_log)
                .delete(handlers::logs::reset_logs),
        )
        .route("/logs/stats", get(handlers::logs::log_stats))
        // GraphQL
        .route(
            "/graphql",
            get(graphql::graphql_get).post(graphql::graphql_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn start_server(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let mut app = build_router(state);
    if config.cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        );
    }

    info!(addr = %config.addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}
