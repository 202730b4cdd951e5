//! SQLite storage implementation.
//!
//! This module provides the `SqliteStore` implementation of the `Store` trait.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};

use namecraft_core::{
    AppendedRound, BatchId, BatchWithNames, CreditOperation, CreditTransaction, Customer,
    GeneratedName, GeneratedNameId, GenerationBatch, GenerationLog, GenerationStats, RoundPage,
    RoundPagination, SavedName, SavedNameId, SavedNameUpdate, SubscriptionStatus, UserId,
};

use crate::error::{Result, StoreError};
use crate::rows::{
    convert_all, timestamp, BatchRow, CustomerRow, GeneratedNameRow, SavedNameRow, TransactionRow,
};
use crate::{CreditGrant, GenerationCommit, Store};

/// Largest page size accepted by `list_batches`.
const MAX_BATCH_PAGE_SIZE: usize = 50;

/// SQLite-backed storage implementation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and run migrations.
    /// The database file's parent directory is created too.
    ///
    /// In-memory URLs are pinned to a single long-lived connection, since
    /// every SQLite connection to `:memory:` sees its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);

            if let Some(parent) = options
                .get_filename()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Database(format!(
                        "failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(url = %url, "SQLite store ready");

        Ok(Self { pool })
    }

    /// Wrap an existing pool. Migrations are not run.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// Statement helpers shared by single operations and compound transactions
// =============================================================================

async fn insert_transaction(conn: &mut SqliteConnection, entry: &CreditTransaction) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO credit_transactions
            (id, user_id, amount, kind, operation, description, order_id, metadata, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(entry.id.to_string())
    .bind(entry.user_id.to_string())
    .bind(entry.amount)
    .bind(entry.kind.as_str())
    .bind(entry.operation.as_str())
    .bind(&entry.description)
    .bind(entry.order_id.as_deref())
    .bind(serde_json::to_string(&entry.metadata)?)
    .bind(timestamp(entry.created_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Conditional decrement plus ledger entry. Must run inside a transaction.
async fn debit_in(
    conn: &mut SqliteConnection,
    user_id: &UserId,
    amount: i64,
    operation: CreditOperation,
    description: &str,
    context: serde_json::Value,
) -> Result<CreditTransaction> {
    let balance_after: Option<i64> = sqlx::query_scalar(
        r"
        UPDATE customers
        SET credits = credits - ?, updated_at = ?
        WHERE user_id = ? AND credits >= ?
        RETURNING credits
        ",
    )
    .bind(amount)
    .bind(timestamp(Utc::now()))
    .bind(user_id.to_string())
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(balance_after) = balance_after else {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT credits FROM customers WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&mut *conn)
                .await?;

        return Err(match balance {
            Some(balance) => StoreError::InsufficientCredits {
                balance,
                required: amount,
            },
            None => StoreError::not_found("customer", user_id),
        });
    };

    let entry = CreditTransaction::debit(
        *user_id,
        amount,
        balance_after + amount,
        operation,
        description.to_string(),
        context,
    );
    insert_transaction(conn, &entry).await?;

    Ok(entry)
}

/// Increment plus ledger entry. Must run inside a transaction.
async fn credit_in(conn: &mut SqliteConnection, grant: &CreditGrant) -> Result<CreditTransaction> {
    let amount = grant.amount.abs();

    let balance_after: Option<i64> = sqlx::query_scalar(
        r"
        UPDATE customers
        SET credits = credits + ?, updated_at = ?
        WHERE user_id = ?
        RETURNING credits
        ",
    )
    .bind(amount)
    .bind(timestamp(Utc::now()))
    .bind(grant.user_id.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    let balance_after =
        balance_after.ok_or_else(|| StoreError::not_found("customer", grant.user_id))?;

    let entry = CreditTransaction::credit(
        grant.user_id,
        amount,
        balance_after - amount,
        grant.operation,
        grant.description.clone(),
        grant.order_id.clone(),
    );
    insert_transaction(conn, &entry).await?;

    Ok(entry)
}

async fn insert_log(conn: &mut SqliteConnection, log: &GenerationLog) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO generation_logs
            (id, user_id, client_ip, english_name, gender, birth_year, personality_traits,
             name_preferences, plan_type, credits_used, names_generated, has_personality,
             has_preferences, is_continuation, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(log.id.to_string())
    .bind(log.user_id.map(|id| id.to_string()))
    .bind(log.client_ip.as_deref())
    .bind(&log.params.english_name)
    .bind(log.params.gender.as_str())
    .bind(log.params.birth_year)
    .bind(log.params.personality_traits.as_deref())
    .bind(log.params.name_preferences.as_deref())
    .bind(log.params.plan_type.code())
    .bind(log.credits_used)
    .bind(log.names_generated)
    .bind(log.params.has_personality())
    .bind(log.params.has_preferences())
    .bind(log.is_continuation)
    .bind(timestamp(log.created_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn fetch_saved_name(
    conn: &mut SqliteConnection,
    user_id: &UserId,
    id: &SavedNameId,
) -> Result<SavedName> {
    sqlx::query_as::<_, SavedNameRow>("SELECT * FROM saved_names WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found("saved name", id))?
        .try_into()
}

#[async_trait]
impl Store for SqliteStore {
    // =========================================================================
    // Customers & Credit Ledger
    // =========================================================================

    async fn get_customer(&self, user_id: &UserId) -> Result<Option<Customer>> {
        sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    async fn ensure_customer(&self, user_id: &UserId, email: Option<&str>) -> Result<Customer> {
        let now = timestamp(Utc::now());

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (user_id, email, credits, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                email = COALESCE(excluded.email, customers.email)
            RETURNING *
            ",
        )
        .bind(user_id.to_string())
        .bind(email)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn debit(
        &self,
        user_id: &UserId,
        amount: i64,
        operation: CreditOperation,
        description: &str,
        context: serde_json::Value,
    ) -> Result<CreditTransaction> {
        let mut tx = self.pool.begin().await?;
        let entry = debit_in(&mut tx, user_id, amount, operation, description, context).await?;
        tx.commit().await?;

        tracing::debug!(
            user_id = %user_id,
            amount = %amount,
            operation = %operation,
            balance_after = ?entry.balance_after(),
            "Credits debited"
        );

        Ok(entry)
    }

    async fn credit(&self, grant: &CreditGrant) -> Result<CreditTransaction> {
        let mut tx = self.pool.begin().await?;
        let entry = credit_in(&mut tx, grant).await?;
        tx.commit().await?;

        tracing::debug!(
            user_id = %grant.user_id,
            amount = %grant.amount,
            operation = %grant.operation,
            balance_after = ?entry.balance_after(),
            "Credits added"
        );

        Ok(entry)
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        // rowid breaks ties between entries written in the same microsecond.
        let rows = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT * FROM credit_transactions
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(user_id.to_string())
        .bind(count(limit))
        .bind(count(offset))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn set_subscription(
        &self,
        user_id: &UserId,
        status: SubscriptionStatus,
        subscription_id: Option<&str>,
        product_id: Option<&str>,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET subscription_status = ?,
                subscription_id = COALESCE(?, subscription_id),
                product_id = COALESCE(?, product_id),
                updated_at = ?
            WHERE user_id = ?
            ",
        )
        .bind(status.as_str())
        .bind(subscription_id)
        .bind(product_id)
        .bind(timestamp(Utc::now()))
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", user_id));
        }

        Ok(())
    }

    // =========================================================================
    // Anonymous Rate Limiting
    // =========================================================================

    async fn consume_rate_limit(&self, ip: &str, day: NaiveDate, limit: u32) -> Result<bool> {
        if limit == 0 {
            return Ok(false);
        }

        // The guarded upsert returns no row once the counter reached the limit.
        let counted: Option<i64> = sqlx::query_scalar(
            r"
            INSERT INTO ip_generation_counts (ip, day, count)
            VALUES (?, ?, 1)
            ON CONFLICT(ip, day) DO UPDATE SET count = count + 1
            WHERE count < ?
            RETURNING count
            ",
        )
        .bind(ip)
        .bind(day.to_string())
        .bind(i64::from(limit))
        .fetch_optional(&self.pool)
        .await?;

        Ok(counted.is_some())
    }

    // =========================================================================
    // Batches & Rounds
    // =========================================================================

    async fn get_batch(
        &self,
        user_id: &UserId,
        batch_id: &BatchId,
    ) -> Result<Option<GenerationBatch>> {
        sqlx::query_as::<_, BatchRow>(
            "SELECT * FROM generation_batches WHERE id = ? AND user_id = ?",
        )
        .bind(batch_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(GenerationBatch::try_from)
        .transpose()
    }

    async fn commit_generation(&self, commit: GenerationCommit<'_>) -> Result<AppendedRound> {
        let cost = commit.plan.cost();
        let names_count = count(commit.names.len());
        let now = timestamp(Utc::now());

        let mut tx = self.pool.begin().await?;

        let description = format!(
            "Generated {} names for {} (plan {})",
            commit.names.len(),
            commit.params.english_name,
            commit.plan
        );
        let context = serde_json::json!({
            "plan_type": commit.plan.code(),
            "names_generated": names_count,
            "continuation": commit.continue_batch.is_some(),
        });
        let entry = debit_in(
            &mut tx,
            &commit.user_id,
            cost,
            CreditOperation::NameGeneration,
            &description,
            context,
        )
        .await?;

        let row = match commit.continue_batch {
            Some(batch_id) => sqlx::query_as::<_, BatchRow>(
                r"
                UPDATE generation_batches
                SET current_round = current_round + 1,
                    names_count = names_count + ?,
                    credits_used = credits_used + ?,
                    updated_at = ?
                WHERE id = ? AND user_id = ?
                RETURNING *
                ",
            )
            .bind(names_count)
            .bind(cost)
            .bind(&now)
            .bind(batch_id.to_string())
            .bind(commit.user_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("batch", batch_id))?,
            None => {
                sqlx::query_as::<_, BatchRow>(
                    r"
                    INSERT INTO generation_batches
                        (id, user_id, english_name, gender, birth_year, personality_traits,
                         name_preferences, plan_type, names_count, credits_used, current_round,
                         created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
                    RETURNING *
                    ",
                )
                .bind(BatchId::generate().to_string())
                .bind(commit.user_id.to_string())
                .bind(&commit.params.english_name)
                .bind(commit.params.gender.as_str())
                .bind(commit.params.birth_year)
                .bind(commit.params.personality_traits.as_deref())
                .bind(commit.params.name_preferences.as_deref())
                .bind(commit.params.plan_type.code())
                .bind(names_count)
                .bind(cost)
                .bind(&now)
                .bind(&now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let batch = GenerationBatch::try_from(row)?;
        let round = batch.current_round;

        for (position, name) in commit.names.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO generated_names
                    (id, batch_id, chinese, pinyin, characters, meaning, cultural_notes,
                     personality_match, style, position_in_batch, generation_round, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(GeneratedNameId::generate().to_string())
            .bind(batch.id.to_string())
            .bind(&name.chinese)
            .bind(&name.pinyin)
            .bind(serde_json::to_string(&name.characters)?)
            .bind(&name.meaning)
            .bind(&name.cultural_notes)
            .bind(&name.personality_match)
            .bind(&name.style)
            .bind(count(position))
            .bind(round)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        insert_log(&mut tx, commit.log).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %commit.user_id,
            batch_id = %batch.id,
            round = %round,
            names = %names_count,
            credits = %cost,
            "Generation committed"
        );

        Ok(AppendedRound {
            batch,
            round,
            remaining_credits: entry.balance_after().unwrap_or_default(),
        })
    }

    async fn get_round(
        &self,
        user_id: &UserId,
        batch_id: &BatchId,
        round: i64,
    ) -> Result<RoundPage> {
        let batch = self
            .get_batch(user_id, batch_id)
            .await?
            .ok_or_else(|| StoreError::not_found("batch", batch_id))?;

        let total_rounds: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(generation_round) FROM generated_names WHERE batch_id = ?",
        )
        .bind(batch_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let pagination = RoundPagination::clamp(round, total_rounds.unwrap_or(1));

        let rows = sqlx::query_as::<_, GeneratedNameRow>(
            r"
            SELECT * FROM generated_names
            WHERE batch_id = ? AND generation_round = ?
            ORDER BY position_in_batch ASC
            ",
        )
        .bind(batch_id.to_string())
        .bind(pagination.current_round)
        .fetch_all(&self.pool)
        .await?;

        Ok(RoundPage {
            batch,
            names: convert_all(rows)?,
            pagination,
        })
    }

    async fn list_batches(
        &self,
        user_id: &UserId,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<BatchWithNames>, i64)> {
        let limit = limit.clamp(1, MAX_BATCH_PAGE_SIZE);
        let offset = page.max(1).saturating_sub(1).saturating_mul(limit);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM generation_batches WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, BatchRow>(
            r"
            SELECT * FROM generation_batches
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(user_id.to_string())
        .bind(count(limit))
        .bind(count(offset))
        .fetch_all(&self.pool)
        .await?;

        let mut batches = Vec::with_capacity(rows.len());
        for row in rows {
            let batch = GenerationBatch::try_from(row)?;

            let name_rows = sqlx::query_as::<_, GeneratedNameRow>(
                r"
                SELECT * FROM generated_names
                WHERE batch_id = ?
                ORDER BY generation_round ASC, position_in_batch ASC
                ",
            )
            .bind(batch.id.to_string())
            .fetch_all(&self.pool)
            .await?;

            let names: Vec<GeneratedName> = convert_all(name_rows)?;
            batches.push(BatchWithNames { batch, names });
        }

        Ok((batches, total))
    }

    async fn delete_batch(&self, user_id: &UserId, batch_id: &BatchId) -> Result<()> {
        let result = sqlx::query("DELETE FROM generation_batches WHERE id = ? AND user_id = ?")
            .bind(batch_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("batch", batch_id));
        }

        Ok(())
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    async fn put_generation_log(&self, log: &GenerationLog) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_log(&mut conn, log).await
    }

    async fn generation_stats(&self, user_id: &UserId) -> Result<GenerationStats> {
        let (total_generations, total_names, total_credits, premium_generations): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r"
            SELECT
                COUNT(*),
                COALESCE(SUM(names_generated), 0),
                COALESCE(SUM(credits_used), 0),
                COALESCE(SUM(CASE WHEN plan_type = '4' THEN 1 ELSE 0 END), 0)
            FROM generation_logs
            WHERE user_id = ?
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(GenerationStats {
            total_generations,
            total_names,
            total_credits,
            premium_generations,
        })
    }

    // =========================================================================
    // Saved Names
    // =========================================================================

    async fn list_saved_names(&self, user_id: &UserId) -> Result<Vec<SavedName>> {
        let rows = sqlx::query_as::<_, SavedNameRow>(
            r"
            SELECT * FROM saved_names
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn put_saved_name(&self, saved: &SavedName) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO saved_names
                (id, user_id, chinese_name, pinyin, meaning, cultural_notes, personality_match,
                 characters, is_favorite, is_selected, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(saved.id.to_string())
        .bind(saved.user_id.to_string())
        .bind(&saved.chinese_name)
        .bind(&saved.pinyin)
        .bind(&saved.meaning)
        .bind(&saved.cultural_notes)
        .bind(&saved.personality_match)
        .bind(serde_json::to_string(&saved.characters)?)
        .bind(saved.is_favorite)
        .bind(saved.is_selected)
        .bind(timestamp(saved.created_at))
        .bind(timestamp(saved.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_saved_name(
        &self,
        user_id: &UserId,
        id: &SavedNameId,
        update: &SavedNameUpdate,
    ) -> Result<SavedName> {
        let now = timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        if update.is_selected == Some(true) {
            sqlx::query(
                r"
                UPDATE saved_names
                SET is_selected = 0, updated_at = ?
                WHERE user_id = ? AND id != ? AND is_selected = 1
                ",
            )
            .bind(&now)
            .bind(user_id.to_string())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(
            r"
            UPDATE saved_names
            SET is_favorite = COALESCE(?, is_favorite),
                is_selected = COALESCE(?, is_selected),
                meaning = COALESCE(?, meaning),
                cultural_notes = COALESCE(?, cultural_notes),
                personality_match = COALESCE(?, personality_match),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(update.is_favorite)
        .bind(update.is_selected)
        .bind(update.meaning.as_deref())
        .bind(update.cultural_notes.as_deref())
        .bind(update.personality_match.as_deref())
        .bind(&now)
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("saved name", id));
        }

        let saved = fetch_saved_name(&mut tx, user_id, id).await?;
        tx.commit().await?;

        Ok(saved)
    }

    async fn select_saved_name(&self, user_id: &UserId, id: &SavedNameId) -> Result<SavedName> {
        let update = SavedNameUpdate {
            is_selected: Some(true),
            ..SavedNameUpdate::default()
        };
        self.update_saved_name(user_id, id, &update).await
    }

    async fn delete_saved_name(&self, user_id: &UserId, id: &SavedNameId) -> Result<()> {
        let result = sqlx::query("DELETE FROM saved_names WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("saved name", id));
        }

        Ok(())
    }

    // =========================================================================
    // Payment Webhooks
    // =========================================================================

    async fn process_webhook_event(
        &self,
        event_id: &str,
        event_type: &str,
        grant: Option<&CreditGrant>,
    ) -> Result<Option<CreditTransaction>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
            VALUES (?, ?, ?)
            ON CONFLICT(event_id) DO NOTHING
            ",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(StoreError::DuplicateEvent {
                event_id: event_id.to_string(),
            });
        }

        let entry = match grant {
            Some(grant) => Some(credit_in(&mut tx, grant).await?),
            None => None,
        };

        tx.commit().await?;

        Ok(entry)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
