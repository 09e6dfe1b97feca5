// Firewatch server library
// Decision: Router assembly lives here so binaries and tests share it

// API routes and types
pub mod api;

// Environment configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

// Services layer
pub mod services;
pub use services::{IncidentService, UploadService};

// Storage layer
pub mod storage;

// Logging
pub mod telemetry;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Json, Router};
use firewatch_core::IncidentStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::ToSchema;

use crate::config::ServerConfig;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// GET /health - Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(openapi::ApiDoc::openapi())
}

/// Services shared by all routes
#[derive(Clone)]
pub struct AppServices {
    pub incidents: Arc<IncidentService>,
    pub uploads: Arc<UploadService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn IncidentStore>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            incidents: Arc::new(IncidentService::new(store)),
            uploads: Arc::new(UploadService::new(uploads_dir)),
        }
    }
}

/// Build the full application router: API routes, upload serving, health,
/// OpenAPI document, CORS for a single origin, and request tracing.
pub fn build_router(services: AppServices, cors_origin: &str) -> Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {cors_origin}"))?;

    let incidents_state =
        api::incidents::AppState::new(services.incidents.clone(), services.uploads.clone());
    let uploads_state = api::uploads::AppState::new(services.uploads);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api-doc/openapi.json", get(openapi_spec))
        .merge(api::incidents::routes(incidents_state))
        .merge(api::uploads::routes(uploads_state))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(false),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Create the data and uploads directories if missing
pub async fn prepare_directories(config: &ServerConfig) -> Result<()> {
    for dir in [&config.data_dir, &config.uploads_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}
