//! Name generation handler.
//!
//! A call moves through authentication, then either the anonymous rate limit
//! or the credit gate, then generation, then persistence. Anonymous callers
//! never touch the credit ledger and signed-in callers never touch the rate
//! limiter.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use namecraft_core::{
    BatchId, GenerationBatch, GenerationLog, GenerationParams, NameData, Plan,
    ANONYMOUS_NAME_COUNT, AUTHENTICATED_NAME_COUNT,
};
use namecraft_store::GenerationCommit;

use crate::auth::{AuthUser, ClientIp, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Birth year as sent by the form: a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BirthYearInput {
    /// `1990`
    Number(i32),
    /// `"1990"` or `""`
    Text(String),
}

/// Generation request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// The caller's English name. Required.
    pub english_name: Option<String>,
    /// `male`, `female` or `neutral`. Required.
    pub gender: Option<String>,
    /// Optional birth year.
    pub birth_year: Option<BirthYearInput>,
    /// Optional personality traits.
    pub personality_traits: Option<String>,
    /// Optional naming preferences.
    pub name_preferences: Option<String>,
    /// `"1"` (default) or `"4"`.
    pub plan_type: Option<String>,
    /// Append a round to `batch_id` instead of opening a batch.
    #[serde(default)]
    pub continue_batch: bool,
    /// Batch to continue.
    pub batch_id: Option<String>,
}

impl GenerateRequest {
    /// Validate into generation parameters.
    fn validate(&self) -> Result<GenerationParams, ApiError> {
        let english_name = non_blank(self.english_name.as_deref())
            .ok_or_else(|| ApiError::BadRequest("englishName is required".into()))?;

        let gender = self
            .gender
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("gender is required".into()))?
            .parse()
            .map_err(|e: namecraft_core::CoreError| ApiError::BadRequest(e.to_string()))?;

        let plan_type = match self.plan_type.as_deref().map(str::trim) {
            None | Some("") => Plan::Standard,
            Some(code) => code
                .parse()
                .map_err(|e: namecraft_core::CoreError| ApiError::BadRequest(e.to_string()))?,
        };

        let birth_year = match &self.birth_year {
            None => None,
            Some(BirthYearInput::Number(year)) => Some(*year),
            Some(BirthYearInput::Text(text)) if text.trim().is_empty() => None,
            Some(BirthYearInput::Text(text)) => Some(
                text.trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest("birthYear must be a year".into()))?,
            ),
        };

        Ok(GenerationParams {
            english_name,
            gender,
            birth_year,
            personality_traits: non_blank(self.personality_traits.as_deref()),
            name_preferences: non_blank(self.name_preferences.as_deref()),
            plan_type,
        })
    }

    /// The batch to continue, if the caller asked for one.
    fn continuation(&self) -> Result<Option<BatchId>, ApiError> {
        if !self.continue_batch {
            return Ok(None);
        }

        let raw = self
            .batch_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("batchId is required when continueBatch is true".into())
            })?;

        raw.parse::<BatchId>()
            .map(Some)
            .map_err(|_| ApiError::NotFound(format!("batch not found: {raw}")))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Generation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// The generated names.
    pub names: Vec<NameData>,
    /// Number of names returned.
    pub total: usize,
    /// Plan charged for this call.
    pub plan_type: Plan,
    /// Credits charged for this call.
    pub credits_used: i64,
    /// Batch the names were stored in (signed-in callers only).
    pub batch_id: Option<BatchId>,
    /// Round the names were stored under.
    pub generation_round: i64,
    /// Whether this call continued an existing batch.
    pub is_continuation: bool,
    /// The batch after this call (signed-in callers only).
    pub batch: Option<GenerationBatch>,
    /// Human-readable summary.
    pub message: String,
    /// Balance after the debit (signed-in callers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_credits: Option<i64>,
}

/// Generate a set of names.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    ClientIp(ip): ClientIp,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let params = body.validate()?;

    // Anonymous callers cannot continue a batch; the flag is ignored for them.
    let response = match user {
        None => generate_anonymous(&state, params, ip).await?,
        Some(user) => {
            let continuation = body.continuation()?;
            generate_for_user(&state, &user, params, continuation).await?
        }
    };

    Ok(Json(response))
}

async fn generate_anonymous(
    state: &AppState,
    mut params: GenerationParams,
    ip: String,
) -> Result<GenerateResponse, ApiError> {
    let today = Utc::now().date_naive();
    let allowed = state
        .store
        .consume_rate_limit(&ip, today, state.config.anonymous_daily_limit)
        .await
        .map_err(|e| ApiError::Internal(format!("rate limit check failed: {e}")))?;

    if !allowed {
        tracing::info!(ip = %ip, "Anonymous daily limit reached");
        return Err(ApiError::RateLimited(
            "Daily free generation limit reached. Sign in to keep generating names.".into(),
        ));
    }

    // Anonymous calls are free and always sample like the standard plan.
    params.plan_type = Plan::Standard;

    let names = state
        .generator
        .generate(&params, false, ANONYMOUS_NAME_COUNT)
        .await;

    let log = GenerationLog::new(None, Some(ip.clone()), params.clone(), 0, names.len(), false);
    if let Err(e) = state.store.put_generation_log(&log).await {
        tracing::warn!(ip = %ip, error = %e, "Failed to record anonymous generation");
    }

    tracing::info!(ip = %ip, names = names.len(), "Anonymous generation completed");

    Ok(GenerateResponse {
        total: names.len(),
        message: format!("Generated {} names", names.len()),
        names,
        plan_type: params.plan_type,
        credits_used: 0,
        batch_id: None,
        generation_round: 1,
        is_continuation: false,
        batch: None,
        remaining_credits: None,
    })
}

async fn generate_for_user(
    state: &AppState,
    user: &AuthUser,
    mut params: GenerationParams,
    continuation: Option<BatchId>,
) -> Result<GenerateResponse, ApiError> {
    let customer = state
        .store
        .ensure_customer(&user.user_id, user.email.as_deref())
        .await?;

    let plan = params.plan_type;
    let cost = plan.cost();
    if !customer.has_sufficient_credits(cost) {
        return Err(ApiError::InsufficientCredits {
            balance: customer.credits,
            required: cost,
        });
    }

    if let Some(batch_id) = continuation {
        let batch = state
            .store
            .get_batch(&user.user_id, &batch_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("batch not found: {batch_id}")))?;

        // Every round of a batch is generated from the batch's own inputs.
        params = GenerationParams {
            plan_type: plan,
            ..batch.params
        };
    }

    let names = state
        .generator
        .generate(&params, true, AUTHENTICATED_NAME_COUNT)
        .await;

    let log = GenerationLog::new(
        Some(user.user_id),
        None,
        params.clone(),
        cost,
        names.len(),
        continuation.is_some(),
    );

    let appended = state
        .store
        .commit_generation(GenerationCommit {
            user_id: user.user_id,
            params: &params,
            plan,
            names: &names,
            continue_batch: continuation,
            log: &log,
        })
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        batch_id = %appended.batch.id,
        round = appended.round,
        plan = %plan,
        "Generation completed"
    );

    let message = if continuation.is_some() {
        format!(
            "Generated {} more names (round {})",
            names.len(),
            appended.round
        )
    } else {
        format!("Generated {} names", names.len())
    };

    Ok(GenerateResponse {
        total: names.len(),
        names,
        plan_type: plan,
        credits_used: cost,
        batch_id: Some(appended.batch.id),
        generation_round: appended.round,
        is_continuation: continuation.is_some(),
        batch: Some(appended.batch),
        message,
        remaining_credits: Some(appended.remaining_credits),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use namecraft_core::Gender;

    fn request() -> GenerateRequest {
        GenerateRequest {
            english_name: Some("  Alice ".into()),
            gender: Some("female".into()),
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn validates_required_fields() {
        let params = request().validate().unwrap();
        assert_eq!(params.english_name, "Alice");
        assert_eq!(params.gender, Gender::Female);
        assert_eq!(params.plan_type, Plan::Standard);
        assert!(request().continuation().unwrap().is_none());

        let missing_name = GenerateRequest {
            english_name: Some("   ".into()),
            ..request()
        };
        assert!(matches!(missing_name.validate(), Err(ApiError::BadRequest(_))));

        let missing_gender = GenerateRequest {
            gender: None,
            ..request()
        };
        assert!(matches!(missing_gender.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn rejects_unknown_plan() {
        let bad_plan = GenerateRequest {
            plan_type: Some("2".into()),
            ..request()
        };
        assert!(matches!(bad_plan.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn accepts_birth_year_as_text() {
        let with_year = GenerateRequest {
            birth_year: Some(BirthYearInput::Text("1990".into())),
            ..request()
        };
        assert_eq!(with_year.validate().unwrap().birth_year, Some(1990));

        let blank = GenerateRequest {
            birth_year: Some(BirthYearInput::Text(String::new())),
            ..request()
        };
        assert_eq!(blank.validate().unwrap().birth_year, None);
    }

    #[test]
    fn continuation_needs_a_batch_id() {
        let no_id = GenerateRequest {
            continue_batch: true,
            ..request()
        };
        assert!(matches!(no_id.continuation(), Err(ApiError::BadRequest(_))));

        let bad_id = GenerateRequest {
            continue_batch: true,
            batch_id: Some("not-a-uuid".into()),
            ..request()
        };
        assert!(matches!(bad_id.continuation(), Err(ApiError::NotFound(_))));

        let id = BatchId::generate();
        let good = GenerateRequest {
            continue_batch: true,
            batch_id: Some(id.to_string()),
            ..request()
        };
        assert_eq!(good.continuation().unwrap(), Some(id));
    }
}
