//! Common test utilities for namecraft integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use namecraft_core::{CreditOperation, UserId};
use namecraft_service::auth::JwtClaims;
use namecraft_service::crypto::hmac_sha256_hex;
use namecraft_service::{
    create_router, AppState, CompletionClient, CompletionRequest, LlmError, ServiceConfig,
};
use namecraft_store::{CreditGrant, SqliteStore, Store};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "test-creem-secret";
pub const CREDIT_PACK_PRODUCT: &str = "prod_pack_10";
pub const MONTHLY_PRODUCT: &str = "prod_monthly_30";

/// Completion client that answers with a fresh, valid name per call unless
/// a scripted reply is queued.
#[derive(Default)]
pub struct StubCompletion {
    calls: AtomicUsize,
    scripted: Mutex<VecDeque<Option<String>>>,
}

impl StubCompletion {
    /// Queue replies for the next calls. `None` simulates a timeout.
    pub fn script(&self, replies: Vec<Option<String>>) {
        self.scripted.lock().unwrap().extend(replies);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn name_reply(chinese: &str) -> String {
    serde_json::json!({
        "chinese": chinese,
        "pinyin": "Cè Shì",
        "characters": [
            { "character": "测", "pinyin": "cè", "meaning": "measure", "explanation": "e" }
        ],
        "meaning": "a test name",
        "culturalNotes": "notes",
        "personalityMatch": "fits",
        "style": "modern"
    })
    .to_string()
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        if let Some(reply) = scripted {
            return reply.ok_or(LlmError::Timeout);
        }
        Ok(name_reply(&format!("测名{n}")))
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for setup and assertions.
    pub store: Arc<SqliteStore>,
    /// Completion stub behind the generator.
    pub completion: Arc<StubCompletion>,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh in-memory database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a harness after adjusting the default test configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        let store = Arc::new(
            SqliteStore::connect("sqlite::memory:", 1)
                .await
                .expect("Failed to open store"),
        );

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url: "sqlite::memory:".into(),
            auth_jwt_secret: Some(JWT_SECRET.into()),
            creem_webhook_secret: Some(WEBHOOK_SECRET.into()),
            creem_product_credits: [
                (CREDIT_PACK_PRODUCT.to_string(), 10),
                (MONTHLY_PRODUCT.to_string(), 30),
            ]
            .into_iter()
            .collect(),
            request_timeout_seconds: 30,
            ..ServiceConfig::default()
        };
        adjust(&mut config);

        let completion = Arc::new(StubCompletion::default());
        let state = AppState::new(store.clone(), config).with_completion_client(completion.clone());
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            completion,
            test_user_id: UserId::generate(),
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        auth_header_for(&self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        auth_header_for(&UserId::generate())
    }

    /// Give the test user `credits` credits.
    pub async fn fund(&self, credits: i64) {
        fund_user(&self.store, &self.test_user_id, credits).await;
    }

    /// Current balance of the test user.
    pub async fn balance(&self) -> i64 {
        self.store
            .get_customer(&self.test_user_id)
            .await
            .unwrap()
            .map_or(0, |c| c.credits)
    }
}

pub fn auth_header_for(user_id: &UserId) -> String {
    format!("Bearer {}", mint_token(user_id, JWT_SECRET))
}

pub fn mint_token(user_id: &UserId, secret: &str) -> String {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        aud: Some(serde_json::json!("authenticated")),
        exp: chrono::Utc::now().timestamp() + 3600,
        email: Some("tester@example.com".into()),
        role: Some("authenticated".into()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub async fn fund_user(store: &SqliteStore, user_id: &UserId, credits: i64) {
    store.ensure_customer(user_id, None).await.unwrap();
    store
        .credit(&CreditGrant {
            user_id: *user_id,
            amount: credits,
            operation: CreditOperation::AdminGrant,
            description: "Test funding".into(),
            order_id: None,
        })
        .await
        .unwrap();
}

/// Hex HMAC-SHA256 signature for a webhook body.
pub fn sign(body: &str) -> String {
    hmac_sha256_hex(WEBHOOK_SECRET, body.as_bytes())
}
