//! Text-to-speech client for name pronunciation.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

/// Longest text accepted for synthesis, in characters.
pub const MAX_TTS_TEXT_CHARS: usize = 500;

/// Error type for TTS operations.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor did not answer within the timeout.
    #[error("speech synthesis timed out")]
    Timeout,

    /// The vendor answered with a non-success status.
    #[error("TTS API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The vendor answered with no audio.
    #[error("TTS API returned no audio")]
    EmptyAudio,
}

/// Synthesized speech.
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// Encoded audio (mp3).
    pub audio: Vec<u8>,
    /// Playback length in seconds, when the vendor reports it.
    pub duration: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    format: &'static str,
}

/// TTS vendor client.
#[derive(Debug, Clone)]
pub struct TtsClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    voice: String,
}

impl TtsClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        voice: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TtsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
            voice: voice.into(),
        })
    }

    /// Synthesize `text`. The duration comes from the `x-audio-duration`
    /// response header when present.
    pub async fn synthesize(&self, text: &str) -> Result<Synthesis, TtsError> {
        let mut request = self.client.post(&self.url).json(&SynthesisRequest {
            text,
            voice: &self.voice,
            format: "mp3",
        });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Api {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let duration = response
            .headers()
            .get("x-audio-duration")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok());

        let audio = response.bytes().await.map_err(classify)?;
        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        Ok(Synthesis {
            audio: audio.to_vec(),
            duration,
        })
    }
}

fn classify(err: reqwest::Error) -> TtsError {
    if err.is_timeout() {
        TtsError::Timeout
    } else {
        TtsError::Http(err)
    }
}

/// Rough playback length for Mandarin speech: about four characters per
/// second, never under one second.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_duration(text: &str) -> f64 {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    (chars as f64 * 0.25).max(1.0)
}
