//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - a signed-in user, verified from the auth provider's HS256 JWT
//! - `MaybeAuthUser` - the same, but anonymous callers are let through
//! - `ClientIp` - the caller's address as reported by the proxy headers

use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use namecraft_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Address used when no proxy header names the caller.
pub const LOOPBACK_IP: &str = "127.0.0.1";

/// JWT claims issued by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Audience (string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Expiration time.
    pub exp: i64,
    /// User email, when present.
    #[serde(default)]
    pub email: Option<String>,
    /// Provider role.
    #[serde(default)]
    pub role: Option<String>,
}

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
    /// Email from the token.
    pub email: Option<String>,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(ApiError::Unauthorized)?;
        authenticate(token, state)
    }
}

/// A caller that may or may not be signed in.
///
/// A missing `Authorization` header means anonymous; a header carrying an
/// invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => authenticate(token, state).map(|user| Self(Some(user))),
            None => Ok(Self(None)),
        }
    }
}

/// The caller's IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip(&parts.headers)))
    }
}

/// First `x-forwarded-for` entry, else `x-real-ip`, else loopback.
#[must_use]
pub fn client_ip(headers: &axum::http::HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(LOOPBACK_IP)
        .to_string()
}

/// The bearer token, `None` when no `Authorization` header is sent.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| ApiError::Unauthorized)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or(ApiError::Unauthorized)
}

fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    let secret = state
        .config
        .auth_jwt_secret
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;

    let claims = validate_jwt(token, secret, &state.config.auth_audience)?;

    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

/// Validate an HS256 token and return its claims.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for any invalid, expired or
/// wrong-audience token.
pub fn validate_jwt(token: &str, secret: &str, audience: &str) -> Result<JwtClaims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}
