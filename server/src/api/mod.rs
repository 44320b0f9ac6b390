//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::jobs::Dispatcher;
use crate::people;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Background job dispatcher
    pub jobs: Dispatcher,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config, jobs: Dispatcher) -> Self {
        Self {
            db,
            config: Arc::new(config),
            jobs,
        }
    }
}

/// OpenAPI document for the people endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::people::search::search,
        crate::people::tags::tag_index,
        crate::people::profile::show,
        crate::people::contacts::contacts_of_contact,
        crate::people::remote::retrieve_remote,
    ),
    components(schemas(
        crate::db::Person,
        crate::db::Post,
        crate::people::types::PeoplePage,
        crate::people::types::ProfileResponse,
        crate::people::types::RemoteLookupResponse,
        crate::people::types::LookupStatus,
    )),
    tags(
        (name = "people", description = "Directory search, profiles, and remote discovery")
    )
)]
struct ApiDoc;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/people", people::router(state.clone()))
        .route("/api/health", get(health))
        .route("/api/openapi.json", get(openapi_json))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "arbor-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve the OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
