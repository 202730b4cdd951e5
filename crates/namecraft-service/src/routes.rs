//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{account, batches, generate, health, pdf, saved_names, tts, webhooks};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent generation calls.
/// Each call fans out to up to six completion requests.
const GENERATE_MAX_CONCURRENT_REQUESTS: usize = 20;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Generation (optional bearer JWT)
/// - `POST /v1/generate` - Generate names; anonymous callers are rate limited
///
/// ## History (bearer JWT)
/// - `GET /v1/batches` - List batches
/// - `DELETE /v1/batches?id=` - Delete a batch
/// - `GET /v1/batches/:id?round=N` - One round of a batch
///
/// ## Saved names (bearer JWT)
/// - `GET /v1/saved-names`, `POST /v1/saved-names`
/// - `PATCH /v1/saved-names/:id`, `DELETE /v1/saved-names/:id`
/// - `POST /v1/saved-names/:id/select`
///
/// ## Account (bearer JWT)
/// - `GET /v1/account` - Balance and subscription
/// - `GET /v1/credits/transactions` - Ledger history
/// - `GET /v1/generations/stats` - Usage totals
///
/// ## Media (bearer JWT)
/// - `POST /v1/tts` - Pronunciation audio
/// - `POST /v1/pdf` - Name certificate (1 credit)
///
/// ## Webhooks (Signature verification)
/// - `POST /webhooks/creem` - Creem payment events
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let generate_routes = Router::new()
        .route("/", post(generate::generate))
        .layer(ConcurrencyLimitLayer::new(GENERATE_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Batches
        .route(
            "/batches",
            get(batches::list_batches).delete(batches::delete_batch),
        )
        .route("/batches/:id", get(batches::get_batch_round))
        // Saved names
        .route(
            "/saved-names",
            get(saved_names::list_saved_names).post(saved_names::save_name),
        )
        .route(
            "/saved-names/:id",
            patch(saved_names::update_saved_name).delete(saved_names::delete_saved_name),
        )
        .route("/saved-names/:id/select", post(saved_names::select_saved_name))
        // Account
        .route("/account", get(account::get_account))
        .route("/credits/transactions", get(account::list_transactions))
        .route("/generations/stats", get(account::generation_stats))
        // Media
        .route("/tts", post(tts::synthesize))
        .route("/pdf", post(pdf::download_certificate))
        // Generation (with its own concurrency limit)
        .nest("/generate", generate_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Webhooks (no concurrency limit - controlled by the payment provider)
        .route("/webhooks/creem", post(webhooks::creem_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
