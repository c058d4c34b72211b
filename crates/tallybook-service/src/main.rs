//! Tallybook Service - HTTP API for invoice, product and customer bookkeeping
//!
//! This is the main entry point for the tallybook service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallybook_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tallybook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tallybook Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        snapshot_path = ?config.snapshot_path,
        gemini_configured = %config.extraction_configured(),
        gemini_model = %config.gemini_model,
        "Service configuration loaded"
    );

    let listen_addr = config.listen_addr.clone();
    let state = AppState::from_config(config);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
