//! Generation analytics records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GenerationLogId, GenerationParams, UserId};

/// Append-only analytics row written once per generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationLog {
    /// Row id.
    pub id: GenerationLogId,
    /// Caller, when signed in.
    pub user_id: Option<UserId>,
    /// Caller IP, for anonymous calls.
    pub client_ip: Option<String>,
    /// Echo of the request inputs.
    #[serde(flatten)]
    pub params: GenerationParams,
    /// Credits charged (0 for anonymous calls).
    pub credits_used: i64,
    /// Names returned.
    pub names_generated: i64,
    /// Whether the call continued an existing batch.
    pub is_continuation: bool,
    /// When the call finished.
    pub created_at: DateTime<Utc>,
}

impl GenerationLog {
    /// Build a log row for a finished call.
    #[must_use]
    pub fn new(
        user_id: Option<UserId>,
        client_ip: Option<String>,
        params: GenerationParams,
        credits_used: i64,
        names_generated: usize,
        is_continuation: bool,
    ) -> Self {
        Self {
            id: GenerationLogId::generate(),
            user_id,
            client_ip,
            params,
            credits_used,
            names_generated: i64::try_from(names_generated).unwrap_or(i64::MAX),
            is_continuation,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate generation totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    /// Generation calls made.
    pub total_generations: i64,
    /// Names produced.
    pub total_names: i64,
    /// Credits spent on generation.
    pub total_credits: i64,
    /// Calls made on the premium plan.
    pub premium_generations: i64,
}
