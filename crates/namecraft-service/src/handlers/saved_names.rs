//! Saved name handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use namecraft_core::{NameData, SavedName, SavedNameId, SavedNameUpdate};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Saved name listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNamesResponse {
    /// The caller's saved names, newest first.
    pub saved_names: Vec<SavedName>,
}

/// Single saved name response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNameResponse {
    /// The saved name after the operation.
    pub saved_name: SavedName,
}

/// Save request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNameRequest {
    /// The generated name to keep.
    pub name_data: NameData,
    /// Mark as favorite on save.
    #[serde(default)]
    pub is_favorite: bool,
}

/// List the caller's saved names.
pub async fn list_saved_names(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SavedNamesResponse>, ApiError> {
    let saved_names = state.store.list_saved_names(&auth.user_id).await?;
    Ok(Json(SavedNamesResponse { saved_names }))
}

/// Save a generated name.
pub async fn save_name(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<SaveNameRequest>,
) -> Result<(StatusCode, Json<SavedNameResponse>), ApiError> {
    if !body.name_data.is_complete() {
        return Err(ApiError::BadRequest(
            "nameData needs chinese, pinyin and characters".into(),
        ));
    }

    state
        .store
        .ensure_customer(&auth.user_id, auth.email.as_deref())
        .await?;

    let saved = SavedName::from_name(auth.user_id, &body.name_data, body.is_favorite);
    state.store.put_saved_name(&saved).await?;

    tracing::info!(
        user_id = %auth.user_id,
        saved_name_id = %saved.id,
        chinese = %saved.chinese_name,
        "Name saved"
    );

    Ok((StatusCode::CREATED, Json(SavedNameResponse { saved_name: saved })))
}

/// Partially update a saved name.
pub async fn update_saved_name(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<SavedNameUpdate>,
) -> Result<Json<SavedNameResponse>, ApiError> {
    let id = parse_saved_name_id(&id)?;
    let saved_name = state
        .store
        .update_saved_name(&auth.user_id, &id, &update)
        .await?;

    Ok(Json(SavedNameResponse { saved_name }))
}

/// Make a saved name the caller's only selected name.
pub async fn select_saved_name(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SavedNameResponse>, ApiError> {
    let id = parse_saved_name_id(&id)?;
    let saved_name = state.store.select_saved_name(&auth.user_id, &id).await?;

    tracing::info!(user_id = %auth.user_id, saved_name_id = %id, "Name selected");

    Ok(Json(SavedNameResponse { saved_name }))
}

/// Delete a saved name.
pub async fn delete_saved_name(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_saved_name_id(&id)?;
    state.store.delete_saved_name(&auth.user_id, &id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

fn parse_saved_name_id(raw: &str) -> Result<SavedNameId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::NotFound(format!("saved name not found: {raw}")))
}
