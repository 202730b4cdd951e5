//! Application state.

use std::sync::Arc;
use std::time::Duration;

use namecraft_store::Store;

use crate::config::ServiceConfig;
use crate::generation::NameGenerator;
use crate::upstream::{CompletionClient, OpenAiClient, PdfRenderer, TtsClient};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Name generation engine.
    pub generator: NameGenerator,

    /// Text-to-speech client (optional).
    pub tts: Option<Arc<TtsClient>>,

    /// PDF renderer client (optional).
    pub pdf: Option<Arc<PdfRenderer>>,
}

impl AppState {
    /// Create a new application state, building upstream clients from the
    /// configuration.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let completion: Option<Arc<dyn CompletionClient>> = config
            .llm_api_url
            .as_ref()
            .zip(config.llm_api_key.as_ref())
            .and_then(|(url, key)| {
                match OpenAiClient::new(
                    url,
                    key,
                    &config.llm_model,
                    Duration::from_secs(config.llm_timeout_seconds),
                ) {
                    Ok(client) => {
                        tracing::info!(llm_url = %url, model = %config.llm_model, "Completion API enabled");
                        Some(Arc::new(client) as Arc<dyn CompletionClient>)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to create completion client");
                        None
                    }
                }
            });

        if completion.is_none() {
            tracing::warn!("Completion API not configured - every name will use the local fallback");
        }

        let tts = config.tts_api_url.as_ref().and_then(|url| {
            match TtsClient::new(
                url,
                config.tts_api_key.clone(),
                &config.tts_voice,
                Duration::from_secs(config.tts_timeout_seconds),
            ) {
                Ok(client) => {
                    tracing::info!("Text-to-speech enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create TTS client");
                    None
                }
            }
        });

        if tts.is_none() {
            tracing::warn!("TTS not configured - pronunciation playback will not be available");
        }

        let pdf = config.pdf_render_url.as_ref().and_then(|url| {
            match PdfRenderer::new(
                url,
                config.pdf_render_token.clone(),
                Duration::from_secs(config.pdf_timeout_seconds),
            ) {
                Ok(client) => {
                    tracing::info!("PDF certificates enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create PDF renderer client");
                    None
                }
            }
        });

        if pdf.is_none() {
            tracing::warn!("PDF renderer not configured - certificates will not be available");
        }

        if config.auth_jwt_secret.is_none() {
            tracing::warn!("AUTH_JWT_SECRET not set - every bearer token will be rejected");
        }

        Self {
            store,
            config,
            generator: NameGenerator::new(completion),
            tts,
            pdf,
        }
    }

    /// Replace the completion client.
    #[must_use]
    pub fn with_completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.generator = NameGenerator::new(Some(client));
        self
    }
}
