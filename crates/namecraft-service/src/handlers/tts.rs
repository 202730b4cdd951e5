//! Pronunciation playback handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::upstream::tts::{estimate_duration, MAX_TTS_TEXT_CHARS};
use crate::upstream::TtsError;

/// Speech request.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    /// Text to read aloud, usually a Chinese name.
    #[serde(default)]
    pub text: String,
}

/// Speech response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Base64 mp3.
    pub audio_data: String,
    /// Playback length in seconds.
    pub duration: f64,
}

/// Synthesize speech for a name.
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text is required".into()));
    }
    if text.chars().count() > MAX_TTS_TEXT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "text must be at most {MAX_TTS_TEXT_CHARS} characters"
        )));
    }

    let tts = state
        .tts
        .as_ref()
        .ok_or_else(|| ApiError::UpstreamUnavailable("Text-to-speech is not configured".into()))?;

    let synthesis = tts.synthesize(text).await.map_err(|e| {
        tracing::warn!(user_id = %auth.user_id, error = %e, "Speech synthesis failed");
        match e {
            TtsError::Timeout => ApiError::UpstreamTimeout("Speech synthesis timed out".into()),
            TtsError::Api { .. } | TtsError::EmptyAudio => {
                ApiError::ExternalService("Speech synthesis failed".into())
            }
            TtsError::Http(err) => ApiError::Internal(err.to_string()),
        }
    })?;

    Ok(Json(TtsResponse {
        success: true,
        duration: synthesis.duration.unwrap_or_else(|| estimate_duration(text)),
        audio_data: BASE64.encode(&synthesis.audio),
    }))
}
