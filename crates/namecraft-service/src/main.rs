//! Namecraft Service - HTTP API for Chinese name generation
//!
//! This is the main entry point for the namecraft service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use namecraft_service::{create_router, AppState, ServiceConfig};
use namecraft_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,namecraft=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Namecraft Service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        llm_configured = %config.llm_api_url.is_some(),
        tts_configured = %config.tts_api_url.is_some(),
        pdf_configured = %config.pdf_render_url.is_some(),
        creem_configured = %config.creem_webhook_secret.is_some(),
        anonymous_daily_limit = config.anonymous_daily_limit,
        "Service configuration loaded"
    );

    tracing::info!(url = %config.database_url, "Opening SQLite store");
    let store = Arc::new(
        SqliteStore::connect(&config.database_url, config.database_max_connections).await?,
    );

    let state = AppState::new(store, config.clone());

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
