//! API error types and responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found, or owned by someone else.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Anonymous daily generation limit reached.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Insufficient credits.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Duplicate event (idempotency).
    #[error("duplicate event: {0}")]
    DuplicateEvent(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Upstream service rejected or failed the request.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Upstream service is not configured.
    #[error("service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream service did not answer in time.
    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limited: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::RateLimited(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                msg.clone(),
                None,
            ),
            Self::InsufficientCredits { balance, required } => (
                StatusCode::FORBIDDEN,
                "insufficient_credits",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::DuplicateEvent(id) => (
                StatusCode::CONFLICT,
                "duplicate_event",
                format!("Event {id} already processed"),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    Some(serde_json::json!({ "reason": msg })),
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
            Self::UpstreamUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
                None,
            ),
            Self::UpstreamTimeout(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                "upstream_timeout",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
            rate_limited: matches!(self, Self::RateLimited(_)).then_some(true),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<namecraft_store::StoreError> for ApiError {
    fn from(err: namecraft_store::StoreError) -> Self {
        match err {
            namecraft_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            namecraft_store::StoreError::InsufficientCredits { balance, required } => {
                Self::InsufficientCredits { balance, required }
            }
            namecraft_store::StoreError::DuplicateEvent { event_id } => {
                Self::DuplicateEvent(event_id)
            }
            namecraft_store::StoreError::Database(msg)
            | namecraft_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_api_errors() {
        let err: ApiError = namecraft_store::StoreError::InsufficientCredits {
            balance: 0,
            required: 4,
        }
        .into();
        assert!(matches!(
            err,
            ApiError::InsufficientCredits {
                balance: 0,
                required: 4
            }
        ));

        let err: ApiError = namecraft_store::StoreError::Database("locked".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn statuses_follow_taxonomy() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ApiError::InsufficientCredits {
                    balance: 0,
                    required: 1,
                },
                StatusCode::FORBIDDEN,
            ),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::RateLimited("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (ApiError::ExternalService("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApiError::UpstreamUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::UpstreamTimeout("x".into()), StatusCode::GATEWAY_TIMEOUT),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
