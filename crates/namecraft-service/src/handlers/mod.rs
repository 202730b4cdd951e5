//! HTTP handlers.

pub mod account;
pub mod batches;
pub mod generate;
pub mod health;
pub mod pdf;
pub mod saved_names;
pub mod tts;
pub mod webhooks;
