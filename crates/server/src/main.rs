// Firewatch API server
// Decision: Single process, state held by an explicit store object (no globals)
// Decision: Incident mirror is loaded once at startup; missing or corrupt files start empty

use anyhow::{Context, Result};
use firewatch_server::config::ServerConfig;
use firewatch_server::storage::JsonFileIncidentStore;
use firewatch_server::telemetry::{init_telemetry, TelemetryConfig};
use firewatch_server::{build_router, prepare_directories, AppServices};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading any configuration
    let dotenv_path = dotenvy::dotenv().ok();

    // Configure via environment variables:
    // - RUST_LOG: Log filter (default: "firewatch_server=debug,tower_http=debug")
    let mut telemetry_config = TelemetryConfig::from_env();
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(&telemetry_config);

    tracing::info!("firewatch-server starting...");
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded environment from .env");
    }

    let config = ServerConfig::from_env();
    prepare_directories(&config).await?;

    let store = JsonFileIncidentStore::open(config.incidents_file()).await;
    let services = AppServices::new(Arc::new(store), config.uploads_dir.clone());

    let app = build_router(services, &config.cors_origin)?;
    tracing::info!(origin = %config.cors_origin, "CORS origin configured");

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
