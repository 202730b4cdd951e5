//! Name generation integration tests.

mod common;

use axum::http::StatusCode;
use common::{auth_header_for, fund_user, name_reply, TestHarness};
use namecraft_core::UserId;
use namecraft_store::Store;
use serde_json::{json, Value};

fn request(plan: &str) -> Value {
    json!({
        "englishName": "Alice",
        "gender": "female",
        "birthYear": "1995",
        "personalityTraits": "curious, calm",
        "planType": plan
    })
}

fn assert_distinct(names: &[Value]) {
    let mut seen: Vec<&str> = names.iter().map(|n| n["chinese"].as_str().unwrap()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), names.len(), "duplicate names: {names:?}");
}

// ============================================================================
// Anonymous callers
// ============================================================================

#[tokio::test]
async fn anonymous_gets_three_names_until_daily_limit() {
    let harness = TestHarness::new().await;

    for _ in 0..3 {
        let response = harness
            .server
            .post("/v1/generate")
            .add_header("x-forwarded-for", "198.51.100.4")
            .json(&request("1"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 3);
        assert_eq!(body["creditsUsed"], 0);
        assert!(body["batchId"].is_null());
        assert_distinct(body["names"].as_array().unwrap());
    }

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("x-forwarded-for", "198.51.100.4")
        .json(&request("1"))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["rateLimited"], true);
    assert_eq!(body["error"]["code"], "rate_limited");

    // Another address still has its own allowance.
    harness
        .server
        .post("/v1/generate")
        .add_header("x-forwarded-for", "198.51.100.5")
        .json(&request("1"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn anonymous_premium_request_is_free_standard() {
    let harness = TestHarness::new().await;

    let response = harness.server.post("/v1/generate").json(&request("4")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["planType"], "1");
    assert_eq!(body["creditsUsed"], 0);
    assert_eq!(body["total"], 3);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn missing_fields_are_rejected() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/generate")
        .json(&json!({ "englishName": "Alice" }))
        .await;
    response.assert_status_bad_request();

    let response = harness
        .server
        .post("/v1/generate")
        .json(&json!({ "gender": "male" }))
        .await;
    response.assert_status_bad_request();

    let response = harness
        .server
        .post("/v1/generate")
        .json(&json!({ "englishName": "Alice", "gender": "female", "planType": "7" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() {
    let harness = TestHarness::new().await;

    for body in [
        json!({ "englishName": 42, "gender": "female" }),
        json!({ "englishName": "Alice", "gender": "female", "birthYear": 1990.5 }),
    ] {
        let response = harness.server.post("/v1/generate").json(&body).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "bad_request");
        assert!(body["error"]["message"].is_string());
    }

    let response = harness.server.post("/v1/generate").text("englishName=Alice").await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");

    assert_eq!(harness.completion.calls(), 0);
}

#[tokio::test]
async fn anonymous_continuation_flag_is_ignored() {
    let harness = TestHarness::new().await;

    let mut body = request("1");
    body["continueBatch"] = json!(true);

    let response = harness.server.post("/v1/generate").json(&body).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["isContinuation"], false);
    assert!(body["batchId"].is_null());

    let mut body = request("1");
    body["continueBatch"] = json!(true);
    body["batchId"] = json!("not-a-batch");

    harness
        .server
        .post("/v1/generate")
        .json(&body)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn invalid_token_is_rejected_not_treated_as_anonymous() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", "Bearer not-a-jwt")
        .json(&request("1"))
        .await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Credits
// ============================================================================

#[tokio::test]
async fn zero_credits_is_refused_without_a_transaction() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("1"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_credits");
    assert_eq!(body["error"]["details"]["required"], 1);
    assert_eq!(harness.completion.calls(), 0);

    let transactions = harness
        .store
        .list_transactions(&harness.test_user_id, 10, 0)
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn premium_then_standard_continuation_spends_five_credits() {
    let harness = TestHarness::new().await;
    harness.fund(5).await;

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("4"))
        .await;

    response.assert_status_ok();
    let first: Value = response.json();
    assert_eq!(first["total"], 6);
    assert_eq!(first["planType"], "4");
    assert_eq!(first["creditsUsed"], 4);
    assert_eq!(first["generationRound"], 1);
    assert_eq!(first["isContinuation"], false);
    assert_eq!(first["remainingCredits"], 1);
    assert_distinct(first["names"].as_array().unwrap());
    let batch_id = first["batchId"].as_str().unwrap().to_string();

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "englishName": "Alice",
            "gender": "female",
            "planType": "1",
            "continueBatch": true,
            "batchId": batch_id
        }))
        .await;

    response.assert_status_ok();
    let second: Value = response.json();
    assert_eq!(second["batchId"], batch_id.as_str());
    assert_eq!(second["generationRound"], 2);
    assert_eq!(second["isContinuation"], true);
    assert_eq!(second["remainingCredits"], 0);
    assert_eq!(second["batch"]["namesCount"], 12);
    assert_eq!(second["batch"]["creditsUsed"], 5);
    assert_eq!(second["batch"]["currentRound"], 2);
    assert_eq!(harness.balance().await, 0);

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("1"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let transactions = harness
        .store
        .list_transactions(&harness.test_user_id, 10, 0)
        .await
        .unwrap();
    let mut debits: Vec<i64> = transactions
        .iter()
        .filter(|t| t.amount < 0)
        .map(|t| t.amount)
        .collect();
    debits.sort_unstable();
    assert_eq!(debits, vec![-4, -1]);
}

#[tokio::test]
async fn continuing_someone_elses_batch_is_not_found() {
    let harness = TestHarness::new().await;
    harness.fund(2).await;

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("1"))
        .await;
    response.assert_status_ok();
    let batch_id = response.json::<Value>()["batchId"].as_str().unwrap().to_string();

    let intruder = UserId::generate();
    fund_user(&harness.store, &intruder, 5).await;

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", auth_header_for(&intruder))
        .json(&json!({
            "englishName": "Mallory",
            "gender": "male",
            "continueBatch": true,
            "batchId": batch_id
        }))
        .await;

    response.assert_status_not_found();
    let intruder_balance = harness
        .store
        .get_customer(&intruder)
        .await
        .unwrap()
        .unwrap()
        .credits;
    assert_eq!(intruder_balance, 5);
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn unparseable_slot_is_filled_by_fallback() {
    let harness = TestHarness::new().await;
    harness.fund(1).await;
    harness.completion.script(vec![
        Some(name_reply("甲乙")),
        Some(name_reply("丙丁")),
        Some("I'm sorry, here are some thoughts about names.".into()),
    ]);

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("1"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let names = body["names"].as_array().unwrap();
    assert_eq!(names.len(), 6);
    assert_eq!(names[0]["chinese"], "甲乙");
    assert_eq!(names[1]["chinese"], "丙丁");
    assert_eq!(names[2]["style"], "classic");
    assert!(names[2]["characters"].as_array().is_some_and(|c| !c.is_empty()));
    assert_distinct(names);
}

#[tokio::test]
async fn upstream_timeouts_still_yield_six_names() {
    let harness = TestHarness::new().await;
    harness.fund(1).await;
    harness.completion.script(vec![None; 6]);

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&request("1"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let names = body["names"].as_array().unwrap();
    assert_eq!(names.len(), 6);
    assert!(names.iter().all(|n| n["style"] == "classic"));
    assert_distinct(names);
}
