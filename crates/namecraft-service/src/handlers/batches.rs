//! Generation batch history handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use namecraft_core::{BatchId, BatchWithNames, RoundPage};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

/// Default page size for batch listings.
const DEFAULT_BATCH_PAGE_SIZE: usize = 10;

/// Largest page size for batch listings.
const MAX_BATCH_PAGE_SIZE: usize = 50;

/// Query for a single round.
#[derive(Debug, Deserialize)]
pub struct RoundQuery {
    /// Round to show; defaults to the first.
    pub round: Option<i64>,
}

/// Get one round of a batch.
pub async fn get_batch_round(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<RoundQuery>,
) -> Result<Json<RoundPage>, ApiError> {
    let batch_id = parse_batch_id(&batch_id)?;

    let page = state
        .store
        .get_round(&auth.user_id, &batch_id, query.round.unwrap_or(1))
        .await?;

    Ok(Json(page))
}

/// Query for the batch listing.
#[derive(Debug, Deserialize)]
pub struct ListBatchesQuery {
    /// 1-based page.
    pub page: Option<usize>,
    /// Batches per page.
    pub limit: Option<usize>,
}

/// Pagination block of a batch listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPagination {
    /// Page returned.
    pub page: usize,
    /// Page size used.
    pub limit: usize,
    /// Total batches owned by the caller.
    pub total: i64,
    /// Number of pages.
    pub total_pages: i64,
}

/// Batch listing response.
#[derive(Debug, Serialize)]
pub struct ListBatchesResponse {
    /// Batches on this page with their names.
    pub batches: Vec<BatchWithNames>,
    /// Pagination details.
    pub pagination: ListPagination,
}

/// List the caller's batches, newest first.
pub async fn list_batches(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListBatchesQuery>,
) -> Result<Json<ListBatchesResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_BATCH_PAGE_SIZE)
        .clamp(1, MAX_BATCH_PAGE_SIZE);

    let (batches, total) = state.store.list_batches(&auth.user_id, page, limit).await?;

    let per_page = i64::try_from(limit).unwrap_or(i64::MAX);
    let total_pages = (total + per_page - 1) / per_page;

    Ok(Json(ListBatchesResponse {
        batches,
        pagination: ListPagination {
            page,
            limit,
            total,
            total_pages,
        },
    }))
}

/// Query for batch deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteBatchQuery {
    /// Batch to delete.
    pub id: Option<String>,
}

/// Delete one of the caller's batches and its names.
pub async fn delete_batch(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<DeleteBatchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = query
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("id is required".into()))?;
    let batch_id = parse_batch_id(raw)?;

    state.store.delete_batch(&auth.user_id, &batch_id).await?;

    tracing::info!(user_id = %auth.user_id, batch_id = %batch_id, "Batch deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}

/// A malformed id cannot name one of the caller's batches.
fn parse_batch_id(raw: &str) -> Result<BatchId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::NotFound(format!("batch not found: {raw}")))
}
