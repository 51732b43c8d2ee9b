// src/bin/api_server.rs

use axum::extract::DefaultBodyLimit;
use brain_gym_coach::storage::open_store;
use brain_gym_coach::transport;
use brain_gym_coach::{AppConfig, CoachService, OpenAiVisionGateway};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("brain_gym_coach=info,api_server=info,tower_http=info")),
        )
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env()?;
    info!(backend = ?config.store_backend, bind = %config.bind_addr, "configuration loaded");
    if config.vision.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /api/exercises/validate will fail until it is");
    }

    // --- Store Initialization ---
    let store = open_store(&config).await?;
    info!("store initialized");

    // --- Gateway + Service Initialization ---
    let gateway = Arc::new(OpenAiVisionGateway::new(config.vision.clone())?);
    let coach = CoachService::new(store, gateway);
    let app_state = transport::http::AppState::new(coach);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("API server listening on http://{}", config.bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received (Ctrl+C)");
            }
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
