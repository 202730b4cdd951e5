//! SQLite storage layer for namecraft.
//!
//! This crate provides persistent storage for customers, the credit ledger,
//! generation batches, saved names, anonymous rate-limit counters and
//! processed payment webhooks.
//!
//! # Consistency
//!
//! Every balance change is a single conditional `UPDATE ... RETURNING`
//! executed in the same transaction as its ledger entry, so concurrent debits
//! can never overdraw a customer. Round numbers come from an atomic
//! per-batch counter and `(batch_id, generation_round, position_in_batch)` is
//! a unique key.
//!
//! # Example
//!
//! ```no_run
//! use namecraft_store::{SqliteStore, Store};
//! use namecraft_core::UserId;
//!
//! # async fn example() -> namecraft_store::Result<()> {
//! let store = SqliteStore::connect("sqlite::memory:", 1).await?;
//!
//! let user_id = UserId::generate();
//! let customer = store.ensure_customer(&user_id, None).await?;
//! assert_eq!(customer.credits, 0);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
mod rows;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use namecraft_core::{
    AppendedRound, BatchId, BatchWithNames, CreditOperation, CreditTransaction, Customer,
    GenerationBatch, GenerationLog, GenerationParams, GenerationStats, NameData, Plan, RoundPage,
    SavedName, SavedNameId, SavedNameUpdate, SubscriptionStatus, UserId,
};

/// Everything written when a signed-in generation call completes.
///
/// Applied as one unit: the debit, the batch upsert, the name rows and the
/// analytics row either all land or none do.
#[derive(Debug, Clone)]
pub struct GenerationCommit<'a> {
    /// Caller.
    pub user_id: UserId,
    /// Inputs of this call.
    pub params: &'a GenerationParams,
    /// Plan charged for this call.
    pub plan: Plan,
    /// Names produced by this call, in position order.
    pub names: &'a [NameData],
    /// Batch to continue, or `None` to open a new one.
    pub continue_batch: Option<BatchId>,
    /// Analytics row for the call.
    pub log: &'a GenerationLog,
}

/// Credits granted by a payment webhook.
#[derive(Debug, Clone)]
pub struct CreditGrant {
    /// Customer to credit.
    pub user_id: UserId,
    /// Credits to add.
    pub amount: i64,
    /// Why.
    pub operation: CreditOperation,
    /// Ledger description.
    pub description: String,
    /// Payment-provider order reference.
    pub order_id: Option<String>,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so handlers can be exercised
/// against any backend.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Customers & Credit Ledger
    // =========================================================================

    /// Get a customer by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_customer(&self, user_id: &UserId) -> Result<Option<Customer>>;

    /// Get a customer, creating one with zero credits if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn ensure_customer(&self, user_id: &UserId, email: Option<&str>) -> Result<Customer>;

    /// Debit credits and append a `subtract` ledger entry atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the customer doesn't exist.
    /// - `StoreError::InsufficientCredits` if the balance is below `amount`.
    async fn debit(
        &self,
        user_id: &UserId,
        amount: i64,
        operation: CreditOperation,
        description: &str,
        context: serde_json::Value,
    ) -> Result<CreditTransaction>;

    /// Credit a customer and append an `add` ledger entry atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the customer doesn't exist.
    async fn credit(&self, grant: &CreditGrant) -> Result<CreditTransaction>;

    /// List ledger entries for a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_transactions(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>>;

    /// Record the subscription state reported by the payment provider.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the customer doesn't exist.
    async fn set_subscription(
        &self,
        user_id: &UserId,
        status: SubscriptionStatus,
        subscription_id: Option<&str>,
        product_id: Option<&str>,
    ) -> Result<()>;

    // =========================================================================
    // Anonymous Rate Limiting
    // =========================================================================

    /// Count one anonymous generation for `ip` on `day` if fewer than `limit`
    /// were counted already. Returns whether the call is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn consume_rate_limit(&self, ip: &str, day: NaiveDate, limit: u32) -> Result<bool>;

    // =========================================================================
    // Batches & Rounds
    // =========================================================================

    /// Get a batch if it exists and belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_batch(&self, user_id: &UserId, batch_id: &BatchId)
        -> Result<Option<GenerationBatch>>;

    /// Debit the plan cost, append the names as a new round, and write the
    /// analytics row in one transaction.
    ///
    /// # Errors
    ///
    /// - `StoreError::InsufficientCredits` if the balance no longer covers the plan.
    /// - `StoreError::NotFound` if the continued batch is missing or not owned.
    async fn commit_generation(&self, commit: GenerationCommit<'_>) -> Result<AppendedRound>;

    /// Get one round of a batch. The round is clamped into range.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the batch is missing or not owned.
    async fn get_round(&self, user_id: &UserId, batch_id: &BatchId, round: i64)
        -> Result<RoundPage>;

    /// List a user's batches (newest first) with their names, plus the total
    /// batch count. `page` is 1-based.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_batches(
        &self,
        user_id: &UserId,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<BatchWithNames>, i64)>;

    /// Delete a batch and its names.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the batch is missing or not owned.
    async fn delete_batch(&self, user_id: &UserId, batch_id: &BatchId) -> Result<()>;

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Append a generation log row on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_generation_log(&self, log: &GenerationLog) -> Result<()>;

    /// Aggregate generation totals for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn generation_stats(&self, user_id: &UserId) -> Result<GenerationStats>;

    // =========================================================================
    // Saved Names
    // =========================================================================

    /// List a user's saved names, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_saved_names(&self, user_id: &UserId) -> Result<Vec<SavedName>>;

    /// Insert a saved name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_saved_name(&self, saved: &SavedName) -> Result<()>;

    /// Apply a partial update. Selecting clears every other selection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the name is missing or not owned.
    async fn update_saved_name(
        &self,
        user_id: &UserId,
        id: &SavedNameId,
        update: &SavedNameUpdate,
    ) -> Result<SavedName>;

    /// Make `id` the user's only selected name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the name is missing or not owned.
    async fn select_saved_name(&self, user_id: &UserId, id: &SavedNameId) -> Result<SavedName>;

    /// Delete a saved name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the name is missing or not owned.
    async fn delete_saved_name(&self, user_id: &UserId, id: &SavedNameId) -> Result<()>;

    // =========================================================================
    // Payment Webhooks
    // =========================================================================

    /// Mark a webhook event processed and apply its credit grant, if any,
    /// atomically. Returns the ledger entry of the grant.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateEvent` if the event was already processed.
    /// - `StoreError::NotFound` if the granted customer doesn't exist.
    async fn process_webhook_event(
        &self,
        event_id: &str,
        event_type: &str,
        grant: Option<&CreditGrant>,
    ) -> Result<Option<CreditTransaction>>;

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    async fn ping(&self) -> Result<()>;
}
