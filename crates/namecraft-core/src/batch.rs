//! Generation batches, their rounds, and round pagination.
//!
//! A batch is one logical generation session for a fixed parameter set. Each
//! call that continues the batch adds a new round of names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchId, GeneratedNameId, GenerationParams, NameData, UserId};

/// A generation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBatch {
    /// Batch id.
    pub id: BatchId,
    /// Owner.
    pub user_id: UserId,
    /// Inputs every round of the batch was generated from.
    #[serde(flatten)]
    pub params: GenerationParams,
    /// Names generated across all rounds.
    pub names_count: i64,
    /// Credits spent across all rounds.
    pub credits_used: i64,
    /// Highest round number handed out so far.
    pub current_round: i64,
    /// When the batch was opened.
    pub created_at: DateTime<Utc>,
    /// When the last round was appended.
    pub updated_at: DateTime<Utc>,
}

/// One stored name of a batch round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedName {
    /// Row id.
    pub id: GeneratedNameId,
    /// Owning batch.
    pub batch_id: BatchId,
    /// The name itself.
    #[serde(flatten)]
    pub name: NameData,
    /// 0-based position within its round.
    pub position_in_batch: i64,
    /// 1-based round number.
    pub generation_round: i64,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// Result of appending a round to a batch.
#[derive(Debug, Clone)]
pub struct AppendedRound {
    /// The batch after the append.
    pub batch: GenerationBatch,
    /// Round number the names were stored under.
    pub round: i64,
    /// Customer balance after the debit.
    pub remaining_credits: i64,
}

/// Round pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPagination {
    /// Round being returned.
    pub current_round: i64,
    /// Number of rounds in the batch (at least 1).
    pub total_rounds: i64,
    /// Whether a later round exists.
    pub has_next: bool,
    /// Whether an earlier round exists.
    pub has_prev: bool,
}

impl RoundPagination {
    /// Clamp `requested` into `[1, total_rounds]`.
    ///
    /// `total_rounds` below 1 is treated as 1 so that empty batches still
    /// page cleanly.
    #[must_use]
    pub fn clamp(requested: i64, total_rounds: i64) -> Self {
        let total_rounds = total_rounds.max(1);
        let current_round = requested.clamp(1, total_rounds);
        Self {
            current_round,
            total_rounds,
            has_next: current_round < total_rounds,
            has_prev: current_round > 1,
        }
    }
}

/// One round of a batch with pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPage {
    /// The batch.
    pub batch: GenerationBatch,
    /// Names of the round, ordered by position.
    pub names: Vec<GeneratedName>,
    /// Pagination metadata.
    pub pagination: RoundPagination,
}

/// A batch with every stored name, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWithNames {
    /// The batch.
    #[serde(flatten)]
    pub batch: GenerationBatch,
    /// All names ordered by round then position.
    pub names: Vec<GeneratedName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_round_zero_to_first() {
        let page = RoundPagination::clamp(0, 3);
        assert_eq!(page.current_round, 1);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn clamps_past_end_to_last() {
        let page = RoundPagination::clamp(9, 3);
        assert_eq!(page.current_round, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn empty_batch_has_one_round() {
        let page = RoundPagination::clamp(1, 0);
        assert_eq!(page.total_rounds, 1);
        assert_eq!(page.current_round, 1);
        assert!(!page.has_next && !page.has_prev);
    }
}
