//! Pronunciation and certificate integration tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::TestHarness;
use namecraft_core::CreditOperation;
use namecraft_store::Store;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn name_data() -> Value {
    json!({
        "chinese": "王浩然",
        "pinyin": "Wáng Hàorán",
        "characters": [
            { "character": "浩", "pinyin": "hào", "meaning": "vast", "explanation": "e" }
        ],
        "meaning": "vast and natural",
        "culturalNotes": "classic",
        "personalityMatch": "open",
        "style": "classic"
    })
}

// ============================================================================
// TTS
// ============================================================================

#[tokio::test]
async fn tts_returns_base64_audio() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "王浩然" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-audio-duration", "1.6")
                .set_body_bytes(b"ID3audio".to_vec()),
        )
        .expect(1)
        .mount(&vendor)
        .await;

    let uri = vendor.uri();
    let harness = TestHarness::with_config(|c| c.tts_api_url = Some(uri)).await;

    let response = harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "王浩然" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["duration"], 1.6);
    let audio = BASE64.decode(body["audioData"].as_str().unwrap()).unwrap();
    assert_eq!(audio, b"ID3audio");
}

#[tokio::test]
async fn tts_validates_and_requires_auth() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/v1/tts")
        .json(&json!({ "text": "王浩然" }))
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "   " }))
        .await
        .assert_status_bad_request();

    harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "字".repeat(501) }))
        .await
        .assert_status_bad_request();

    harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "王浩然" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn tts_maps_vendor_failures() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "慢" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_bytes(b"late".to_vec()),
        )
        .mount(&vendor)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "错" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&vendor)
        .await;

    let uri = vendor.uri();
    let harness = TestHarness::with_config(|c| {
        c.tts_api_url = Some(uri);
        c.tts_timeout_seconds = 1;
    })
    .await;

    harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "慢" }))
        .await
        .assert_status(StatusCode::GATEWAY_TIMEOUT);

    harness
        .server
        .post("/v1/tts")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "text": "错" }))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

// ============================================================================
// PDF certificates
// ============================================================================

#[tokio::test]
async fn certificate_costs_one_credit() {
    let renderer = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 cert".to_vec()))
        .expect(1)
        .mount(&renderer)
        .await;

    let uri = renderer.uri();
    let harness = TestHarness::with_config(|c| c.pdf_render_url = Some(uri)).await;
    harness.fund(2).await;

    let response = harness
        .server
        .post("/v1/pdf")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "nameData": name_data(),
            "userData": { "englishName": "Howard", "birthYear": 1990 }
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert!(response
        .header("content-disposition")
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.7 cert");
    assert_eq!(harness.balance().await, 1);

    let transactions = harness
        .store
        .list_transactions(&harness.test_user_id, 10, 0)
        .await
        .unwrap();
    assert!(transactions
        .iter()
        .any(|t| t.operation == CreditOperation::PdfCertificate && t.amount == -1));
}

#[tokio::test]
async fn certificate_needs_a_credit_and_is_not_charged_on_failure() {
    let renderer = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&renderer)
        .await;

    let uri = renderer.uri();
    let harness = TestHarness::with_config(|c| c.pdf_render_url = Some(uri)).await;

    harness
        .server
        .post("/v1/pdf")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "nameData": name_data() }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    harness.fund(1).await;

    harness
        .server
        .post("/v1/pdf")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "nameData": name_data() }))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    assert_eq!(harness.balance().await, 1);
}
