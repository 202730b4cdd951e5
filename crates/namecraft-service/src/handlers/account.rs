//! Account, credit ledger and usage statistics handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use namecraft_core::{CreditTransaction, Customer, GenerationStats, SubscriptionStatus};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Default number of ledger entries per page.
const DEFAULT_TRANSACTION_LIMIT: usize = 50;

/// Largest ledger page.
const MAX_TRANSACTION_LIMIT: usize = 100;

/// Account response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// User ID.
    pub user_id: String,
    /// Email, when known.
    pub email: Option<String>,
    /// Current credit balance.
    pub credits: i64,
    /// Subscription state.
    pub subscription_status: Option<SubscriptionStatus>,
    /// Whether the subscription is currently active.
    pub has_active_subscription: bool,
    /// Subscribed product.
    pub product_id: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Customer> for AccountResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            user_id: customer.user_id.to_string(),
            email: customer.email.clone(),
            credits: customer.credits,
            subscription_status: customer.subscription_status,
            has_active_subscription: customer.has_active_subscription(),
            product_id: customer.product_id.clone(),
            created_at: customer.created_at.to_rfc3339(),
        }
    }
}

/// Get the caller's account, creating it on first access.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let customer = state
        .store
        .ensure_customer(&auth.user_id, auth.email.as_deref())
        .await?;

    Ok(Json(AccountResponse::from(&customer)))
}

/// Query for the ledger listing.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// Entries per page.
    pub limit: Option<usize>,
    /// Entries to skip.
    pub offset: Option<usize>,
}

/// Ledger listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    /// Entries, newest first.
    pub transactions: Vec<CreditTransaction>,
    /// Whether more entries may follow.
    pub has_more: bool,
}

/// List the caller's credit ledger.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
        .clamp(1, MAX_TRANSACTION_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let transactions = state
        .store
        .list_transactions(&auth.user_id, limit, offset)
        .await?;
    let has_more = transactions.len() == limit;

    Ok(Json(TransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Aggregate generation totals for the caller.
pub async fn generation_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<GenerationStats>, ApiError> {
    let stats = state.store.generation_stats(&auth.user_id).await?;
    Ok(Json(stats))
}
