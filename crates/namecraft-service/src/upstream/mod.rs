//! Clients for the external services the API orchestrates.

pub mod llm;
pub mod pdf;
pub mod tts;

pub use llm::{CompletionClient, CompletionRequest, LlmError, OpenAiClient};
pub use pdf::{PdfError, PdfRenderer};
pub use tts::{Synthesis, TtsClient, TtsError};
