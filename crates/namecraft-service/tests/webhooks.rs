//! Creem webhook integration tests.

mod common;

use axum::http::StatusCode;
use common::{sign, TestHarness, CREDIT_PACK_PRODUCT, MONTHLY_PRODUCT};
use namecraft_core::SubscriptionStatus;
use namecraft_store::Store;
use serde_json::{json, Value};

fn checkout_event(event_id: &str, user_id: &str) -> String {
    json!({
        "id": event_id,
        "eventType": "checkout.completed",
        "object": {
            "id": "ch_1",
            "order": { "id": "ord_1", "product": CREDIT_PACK_PRODUCT },
            "product": { "id": CREDIT_PACK_PRODUCT },
            "metadata": { "userId": user_id }
        }
    })
    .to_string()
}

#[tokio::test]
async fn checkout_credits_once_even_when_replayed() {
    let harness = TestHarness::new().await;
    let body = checkout_event("evt_checkout_1", &harness.test_user_id.to_string());

    let response = harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&body))
        .text(&body)
        .await;

    response.assert_status_ok();
    let first: Value = response.json();
    assert_eq!(first["received"], true);
    assert!(first.get("duplicate").is_none());
    assert_eq!(harness.balance().await, 10);

    let response = harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&body))
        .text(&body)
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["duplicate"], true);
    assert_eq!(harness.balance().await, 10);

    let transactions = harness
        .store
        .list_transactions(&harness.test_user_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].order_id.as_deref(), Some("ord_1"));
}

#[tokio::test]
async fn bad_or_missing_signature_is_rejected() {
    let harness = TestHarness::new().await;
    let body = checkout_event("evt_forged", &harness.test_user_id.to_string());

    harness
        .server
        .post("/webhooks/creem")
        .text(&body)
        .await
        .assert_status_bad_request();

    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign("something else"))
        .text(&body)
        .await
        .assert_status_bad_request();

    assert_eq!(harness.balance().await, 0);
}

#[tokio::test]
async fn unconfigured_secret_refuses_webhooks() {
    let harness = TestHarness::with_config(|c| c.creem_webhook_secret = None).await;
    let body = checkout_event("evt_1", &harness.test_user_id.to_string());

    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&body))
        .text(&body)
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn subscription_lifecycle_updates_customer() {
    let harness = TestHarness::new().await;
    let user_id = harness.test_user_id.to_string();

    let paid = json!({
        "id": "evt_sub_paid",
        "eventType": "subscription.paid",
        "object": {
            "id": "sub_42",
            "product": MONTHLY_PRODUCT,
            "metadata": { "user_id": user_id }
        }
    })
    .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&paid))
        .text(&paid)
        .await
        .assert_status_ok();

    let customer = harness
        .store
        .get_customer(&harness.test_user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.credits, 30);
    assert_eq!(customer.subscription_status, Some(SubscriptionStatus::Active));
    assert_eq!(customer.subscription_id.as_deref(), Some("sub_42"));

    let canceled = json!({
        "id": "evt_sub_canceled",
        "eventType": "subscription.canceled",
        "object": { "id": "sub_42", "metadata": { "userId": user_id } }
    })
    .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&canceled))
        .text(&canceled)
        .await
        .assert_status_ok();

    let customer = harness
        .store
        .get_customer(&harness.test_user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.subscription_status, Some(SubscriptionStatus::Canceled));
    assert_eq!(customer.credits, 30);
}

#[tokio::test]
async fn subscription_checkout_then_first_payment_credits_once() {
    let harness = TestHarness::new().await;
    let user_id = harness.test_user_id.to_string();

    let checkout = json!({
        "id": "evt_sub_checkout",
        "eventType": "checkout.completed",
        "object": {
            "id": "ch_sub",
            "order": { "id": "ord_sub", "product": MONTHLY_PRODUCT },
            "product": { "id": MONTHLY_PRODUCT },
            "subscription": { "id": "sub_9" },
            "metadata": { "userId": user_id }
        }
    })
    .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&checkout))
        .text(&checkout)
        .await
        .assert_status_ok();

    let customer = harness
        .store
        .get_customer(&harness.test_user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.credits, 0);
    assert_eq!(customer.subscription_status, Some(SubscriptionStatus::Active));
    assert_eq!(customer.subscription_id.as_deref(), Some("sub_9"));

    let paid = json!({
        "id": "evt_sub_first_payment",
        "eventType": "subscription.paid",
        "object": {
            "id": "sub_9",
            "product": MONTHLY_PRODUCT,
            "metadata": { "userId": user_id }
        }
    })
    .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&paid))
        .text(&paid)
        .await
        .assert_status_ok();

    assert_eq!(harness.balance().await, 30);
    let transactions = harness
        .store
        .list_transactions(&harness.test_user_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn unknown_events_and_products_are_acknowledged() {
    let harness = TestHarness::new().await;

    let refund = json!({ "id": "evt_refund", "eventType": "refund.created", "object": {} })
        .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&refund))
        .text(&refund)
        .await
        .assert_status_ok();

    let unknown_product = json!({
        "id": "evt_unknown_product",
        "eventType": "checkout.completed",
        "object": {
            "id": "ch_9",
            "product": "prod_not_configured",
            "metadata": { "userId": harness.test_user_id.to_string() }
        }
    })
    .to_string();
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&unknown_product))
        .text(&unknown_product)
        .await
        .assert_status_ok();

    assert_eq!(harness.balance().await, 0);
}

#[tokio::test]
async fn purchased_credits_can_be_spent() {
    let harness = TestHarness::new().await;
    let body = checkout_event("evt_checkout_spend", &harness.test_user_id.to_string());
    harness
        .server
        .post("/webhooks/creem")
        .add_header("creem-signature", sign(&body))
        .text(&body)
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "englishName": "Ann", "gender": "female", "planType": "4" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["remainingCredits"], 6);
}
