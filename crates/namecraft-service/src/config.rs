//! Service configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// SQLite database URL (default: `sqlite://data/namecraft.db`).
    pub database_url: String,

    /// Maximum pooled database connections (default: 5).
    pub database_max_connections: u32,

    /// HS256 secret the auth provider signs access tokens with.
    pub auth_jwt_secret: Option<String>,

    /// Expected JWT audience (default: "authenticated").
    pub auth_audience: String,

    /// Base URL of the OpenAI-compatible completion API.
    pub llm_api_url: Option<String>,

    /// Completion API key.
    pub llm_api_key: Option<String>,

    /// Completion model name.
    pub llm_model: String,

    /// Completion request timeout in seconds (default: 45).
    pub llm_timeout_seconds: u64,

    /// Text-to-speech endpoint.
    pub tts_api_url: Option<String>,

    /// Text-to-speech API key.
    pub tts_api_key: Option<String>,

    /// Voice used for pronunciation playback.
    pub tts_voice: String,

    /// TTS request timeout in seconds (default: 30).
    pub tts_timeout_seconds: u64,

    /// HTML-to-PDF renderer endpoint.
    pub pdf_render_url: Option<String>,

    /// Bearer token for the PDF renderer.
    pub pdf_render_token: Option<String>,

    /// PDF render timeout in seconds (default: 30).
    pub pdf_timeout_seconds: u64,

    /// Creem webhook signing secret.
    pub creem_webhook_secret: Option<String>,

    /// Credits granted per Creem product id.
    pub creem_product_credits: HashMap<String, i64>,

    /// Anonymous generations allowed per IP per UTC day (default: 3).
    pub anonymous_daily_limit: u32,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// LLM secrets file structure.
#[derive(Debug, Deserialize)]
struct LlmSecrets {
    api_url: String,
    api_key: String,
    #[serde(default)]
    model: Option<String>,
}

/// Creem secrets file structure.
#[derive(Debug, Deserialize)]
struct CreemSecrets {
    webhook_secret: String,
    #[serde(default)]
    product_credits: HashMap<String, i64>,
}

const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
const DEFAULT_TTS_VOICE: &str = "zh-CN-XiaoxiaoNeural";

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (llm_api_url, llm_api_key, llm_model) = load_llm_secrets();
        let (creem_webhook_secret, creem_product_credits) = load_creem_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/namecraft.db".into()),
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 5),
            auth_jwt_secret: std::env::var("AUTH_JWT_SECRET").ok(),
            auth_audience: std::env::var("AUTH_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".into()),
            llm_api_url,
            llm_api_key,
            llm_model,
            llm_timeout_seconds: env_parse("LLM_TIMEOUT_SECONDS", 45),
            tts_api_url: std::env::var("TTS_API_URL").ok(),
            tts_api_key: std::env::var("TTS_API_KEY").ok(),
            tts_voice: std::env::var("TTS_VOICE").unwrap_or_else(|_| DEFAULT_TTS_VOICE.into()),
            tts_timeout_seconds: env_parse("TTS_TIMEOUT_SECONDS", 30),
            pdf_render_url: std::env::var("PDF_RENDER_URL").ok(),
            pdf_render_token: std::env::var("PDF_RENDER_TOKEN").ok(),
            pdf_timeout_seconds: env_parse("PDF_TIMEOUT_SECONDS", 30),
            creem_webhook_secret,
            creem_product_credits,
            anonymous_daily_limit: env_parse("ANONYMOUS_DAILY_LIMIT", 3),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 1024 * 1024), // 1MB
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS", 120),
        }
    }

    /// Credits granted by a purchase of `product_id`, if the product is known.
    #[must_use]
    pub fn credits_for_product(&self, product_id: &str) -> Option<i64> {
        self.creem_product_credits.get(product_id).copied()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse `prod_a:50,prod_b:120` into a product-to-credits map.
///
/// Malformed entries are skipped.
pub fn parse_product_credits(raw: &str) -> HashMap<String, i64> {
    raw.split(',')
        .filter_map(|entry| {
            let (product, credits) = entry.trim().split_once(':')?;
            let credits = credits.trim().parse::<i64>().ok().filter(|c| *c > 0)?;
            Some((product.trim().to_string(), credits))
        })
        .filter(|(product, _)| !product.is_empty())
        .collect()
}

/// Load LLM secrets from file or environment.
fn load_llm_secrets() -> (Option<String>, Option<String>, String) {
    let secret_paths = [".secrets/llm.json", "../.secrets/llm.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<LlmSecrets>(path) {
            tracing::info!(path = %path, "Loaded LLM secrets from file");
            return (
                Some(secrets.api_url),
                Some(secrets.api_key),
                secrets.model.unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            );
        }
    }

    tracing::debug!("LLM secrets file not found, using environment variables");
    (
        std::env::var("LLM_API_URL").ok(),
        std::env::var("LLM_API_KEY").ok(),
        std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.into()),
    )
}

/// Load Creem secrets from file or environment.
fn load_creem_secrets() -> (Option<String>, HashMap<String, i64>) {
    let secret_paths = [".secrets/creem.json", "../.secrets/creem.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<CreemSecrets>(path) {
            tracing::info!(path = %path, "Loaded Creem secrets from file");
            return (Some(secrets.webhook_secret), secrets.product_credits);
        }
    }

    tracing::debug!("Creem secrets file not found, using environment variables");
    (
        std::env::var("CREEM_WEBHOOK_SECRET").ok(),
        std::env::var("CREEM_PRODUCT_CREDITS")
            .map(|raw| parse_product_credits(&raw))
            .unwrap_or_default(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: "sqlite://data/namecraft.db".into(),
            database_max_connections: 5,
            auth_jwt_secret: None,
            auth_audience: "authenticated".into(),
            llm_api_url: None,
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.into(),
            llm_timeout_seconds: 45,
            tts_api_url: None,
            tts_api_key: None,
            tts_voice: DEFAULT_TTS_VOICE.into(),
            tts_timeout_seconds: 30,
            pdf_render_url: None,
            pdf_render_token: None,
            pdf_timeout_seconds: 30,
            creem_webhook_secret: None,
            creem_product_credits: HashMap::new(),
            anonymous_daily_limit: 3,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 120,
        }
    }
}
