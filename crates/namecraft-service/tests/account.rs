//! Account, ledger and usage statistics integration tests.

mod common;

use common::TestHarness;
use serde_json::{json, Value};

#[tokio::test]
async fn account_is_created_on_first_access() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/v1/account")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["userId"], harness.test_user_id.to_string());
    assert_eq!(body["credits"], 0);
    assert_eq!(body["email"], "tester@example.com");
    assert_eq!(body["hasActiveSubscription"], false);
}

#[tokio::test]
async fn account_requires_auth() {
    let harness = TestHarness::new().await;

    harness
        .server
        .get("/v1/account")
        .await
        .assert_status_unauthorized();

    let forged = common::mint_token(&harness.test_user_id, "wrong-secret");
    harness
        .server
        .get("/v1/account")
        .add_header("authorization", format!("Bearer {forged}"))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn ledger_and_stats_follow_generations() {
    let harness = TestHarness::new().await;
    harness.fund(6).await;

    for plan in ["1", "4"] {
        harness
            .server
            .post("/v1/generate")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "englishName": "Kai", "gender": "neutral", "planType": plan }))
            .await
            .assert_status_ok();
    }

    let response = harness
        .server
        .get("/v1/credits/transactions?limit=3")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 3);
    assert_eq!(body["hasMore"], true);
    let debits = transactions
        .iter()
        .filter(|t| t["type"] == "subtract" && t["operation"] == "name_generation")
        .count();
    assert_eq!(debits, 2);

    let response = harness
        .server
        .get("/v1/generations/stats")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["totalGenerations"], 2);
    assert_eq!(stats["totalNames"], 12);
    assert_eq!(stats["totalCredits"], 5);
    assert_eq!(stats["premiumGenerations"], 1);

    let response = harness
        .server
        .get("/v1/account")
        .add_header("authorization", harness.user_auth_header())
        .await;
    assert_eq!(response.json::<Value>()["credits"], 1);
}
