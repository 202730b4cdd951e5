//! Creem payment webhook handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use namecraft_core::{CreditOperation, SubscriptionStatus, UserId};
use namecraft_store::{CreditGrant, StoreError};

use crate::crypto::verify_creem_signature;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "creem-signature";

/// Creem webhook payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreemWebhook {
    /// Event ID, unique per delivery.
    pub id: String,
    /// Event type, e.g. `checkout.completed`.
    pub event_type: String,
    /// Event object.
    #[serde(default)]
    pub object: serde_json::Value,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was accepted.
    pub received: bool,
    /// Set when the event was already processed earlier.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// What an event asks us to do.
#[derive(Debug, Default)]
struct EventEffect {
    grant: Option<CreditGrant>,
    subscription: Option<SubscriptionChange>,
}

#[derive(Debug)]
struct SubscriptionChange {
    user_id: UserId,
    status: SubscriptionStatus,
    subscription_id: Option<String>,
    product_id: Option<String>,
}

/// Handle Creem webhooks.
pub async fn creem_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let secret = state.config.creem_webhook_secret.as_deref().ok_or_else(|| {
        tracing::error!("CREEM_WEBHOOK_SECRET not configured - rejecting webhook");
        ApiError::UpstreamUnavailable("Payment webhooks are not configured".into())
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Creem signature".into()))?;

    if !verify_creem_signature(secret, &body, signature) {
        tracing::warn!("Invalid Creem webhook signature");
        return Err(ApiError::BadRequest("Invalid webhook signature".into()));
    }

    let webhook: CreemWebhook =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        "Received Creem webhook"
    );

    let effect = match webhook.event_type.as_str() {
        "checkout.completed" => checkout_completed(&state, &webhook.object)?,
        "subscription.paid" => subscription_paid(&state, &webhook.object)?,
        "subscription.active" | "subscription.update" => {
            subscription_changed(&webhook.object, SubscriptionStatus::Active)?
        }
        "subscription.canceled" => {
            subscription_changed(&webhook.object, SubscriptionStatus::Canceled)?
        }
        "subscription.expired" => {
            subscription_changed(&webhook.object, SubscriptionStatus::Expired)?
        }
        _ => {
            tracing::debug!(event_type = %webhook.event_type, "Unhandled Creem event");
            EventEffect::default()
        }
    };

    if let Some(grant) = &effect.grant {
        state.store.ensure_customer(&grant.user_id, None).await?;
    }

    let tx = match state
        .store
        .process_webhook_event(&webhook.id, &webhook.event_type, effect.grant.as_ref())
        .await
    {
        Ok(tx) => tx,
        Err(StoreError::DuplicateEvent { event_id }) => {
            tracing::info!(event_id = %event_id, "Creem event already processed");
            return Ok(Json(WebhookResponse {
                received: true,
                duplicate: true,
            }));
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(tx) = tx {
        tracing::info!(
            user_id = %tx.user_id,
            credits_added = tx.amount,
            new_balance = ?tx.balance_after(),
            transaction_id = %tx.id,
            "Credits added from Creem payment"
        );
    }

    if let Some(change) = effect.subscription {
        state.store.ensure_customer(&change.user_id, None).await?;
        state
            .store
            .set_subscription(
                &change.user_id,
                change.status,
                change.subscription_id.as_deref(),
                change.product_id.as_deref(),
            )
            .await?;

        tracing::info!(
            user_id = %change.user_id,
            status = %change.status,
            "Subscription status updated"
        );
    }

    Ok(Json(WebhookResponse {
        received: true,
        duplicate: false,
    }))
}

fn checkout_completed(
    state: &AppState,
    object: &serde_json::Value,
) -> Result<EventEffect, ApiError> {
    let user_id = user_id(object)?;
    let product_id = product_id(object);
    let order_id = object
        .pointer("/order/id")
        .and_then(serde_json::Value::as_str)
        .or_else(|| object.get("id").and_then(serde_json::Value::as_str))
        .map(String::from);

    let subscription = subscription_id(object.get("subscription")).map(|id| SubscriptionChange {
        user_id,
        status: SubscriptionStatus::Active,
        subscription_id: Some(id),
        product_id: product_id.clone(),
    });

    // Subscription credits are granted by `subscription.paid` only.
    let grant = if subscription.is_some() {
        None
    } else {
        product_grant(
            state,
            user_id,
            product_id.as_deref(),
            CreditOperation::Purchase,
            order_id,
        )
    };

    Ok(EventEffect {
        grant,
        subscription,
    })
}

fn subscription_paid(
    state: &AppState,
    object: &serde_json::Value,
) -> Result<EventEffect, ApiError> {
    let user_id = user_id(object)?;
    let product_id = product_id(object);
    let subscription_id = object
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map(String::from);
    let order_id = object
        .get("last_transaction_id")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .or_else(|| subscription_id.clone());

    Ok(EventEffect {
        grant: product_grant(
            state,
            user_id,
            product_id.as_deref(),
            CreditOperation::SubscriptionGrant,
            order_id,
        ),
        subscription: Some(SubscriptionChange {
            user_id,
            status: SubscriptionStatus::Active,
            subscription_id,
            product_id,
        }),
    })
}

fn subscription_changed(
    object: &serde_json::Value,
    status: SubscriptionStatus,
) -> Result<EventEffect, ApiError> {
    Ok(EventEffect {
        grant: None,
        subscription: Some(SubscriptionChange {
            user_id: user_id(object)?,
            status,
            subscription_id: object
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
            product_id: product_id(object),
        }),
    })
}

fn product_grant(
    state: &AppState,
    user_id: UserId,
    product_id: Option<&str>,
    operation: CreditOperation,
    order_id: Option<String>,
) -> Option<CreditGrant> {
    let Some(product_id) = product_id else {
        tracing::warn!(user_id = %user_id, "Creem event without a product - no credits granted");
        return None;
    };
    let Some(amount) = state.config.credits_for_product(product_id) else {
        tracing::warn!(product_id = %product_id, "Unknown Creem product - no credits granted");
        return None;
    };

    let description = match operation {
        CreditOperation::SubscriptionGrant => format!("Subscription credits ({product_id})"),
        _ => format!("Purchased {amount} credits ({product_id})"),
    };

    Some(CreditGrant {
        user_id,
        amount,
        operation,
        description,
        order_id,
    })
}

/// The buyer, from the metadata the checkout was created with.
fn user_id(object: &serde_json::Value) -> Result<UserId, ApiError> {
    let raw = ["userId", "user_id", "referenceId"]
        .iter()
        .find_map(|key| {
            object
                .get("metadata")
                .and_then(|m| m.get(*key))
                .and_then(serde_json::Value::as_str)
        })
        .or_else(|| object.get("request_id").and_then(serde_json::Value::as_str))
        .ok_or_else(|| ApiError::BadRequest("Missing userId in webhook metadata".into()))?;

    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user_id: {raw}")))
}

/// `product` is either an expanded object or a bare id.
fn product_id(object: &serde_json::Value) -> Option<String> {
    let from = |value: Option<&serde_json::Value>| -> Option<String> {
        match value? {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Object(map) => map
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
            _ => None,
        }
    };

    from(object.get("product")).or_else(|| from(object.pointer("/order/product")))
}

fn subscription_id(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Object(map) => map
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_user_id_from_metadata_variants() {
        let id = UserId::generate();
        for key in ["userId", "user_id", "referenceId"] {
            let object = json!({ "metadata": { key: id.to_string() } });
            assert_eq!(user_id(&object).unwrap(), id);
        }
        assert!(matches!(user_id(&json!({})), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            user_id(&json!({ "metadata": { "userId": "nope" } })),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn reads_product_id_in_every_shape() {
        assert_eq!(
            product_id(&json!({ "product": { "id": "prod_a" } })).as_deref(),
            Some("prod_a")
        );
        assert_eq!(product_id(&json!({ "product": "prod_b" })).as_deref(), Some("prod_b"));
        assert_eq!(
            product_id(&json!({ "order": { "product": "prod_c" } })).as_deref(),
            Some("prod_c")
        );
        assert_eq!(product_id(&json!({})), None);
    }

    #[test]
    fn subscription_id_accepts_object_or_string() {
        assert_eq!(subscription_id(Some(&json!("sub_1"))).as_deref(), Some("sub_1"));
        assert_eq!(
            subscription_id(Some(&json!({ "id": "sub_2" }))).as_deref(),
            Some("sub_2")
        );
        assert_eq!(subscription_id(None), None);
    }
}
