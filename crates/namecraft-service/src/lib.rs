//! Namecraft HTTP API Service.
//!
//! This crate provides the HTTP API for the namecraft Chinese name
//! generator, including:
//!
//! - Name generation with batches and continuation rounds
//! - Credit balance and ledger history
//! - Saved names
//! - Pronunciation audio and PDF certificates
//! - Creem payment webhooks
//!
//! # Authentication
//!
//! Signed-in callers present the auth provider's HS256 JWT as a bearer
//! token. `POST /v1/generate` also serves anonymous callers, limited per
//! client IP per UTC day.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod generation;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use generation::NameGenerator;
pub use routes::create_router;
pub use state::AppState;
pub use upstream::{CompletionClient, CompletionRequest, LlmError, OpenAiClient};
