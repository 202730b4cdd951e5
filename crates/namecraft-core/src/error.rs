//! Error types for namecraft domain values.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing or validating domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Plan code other than `"1"` or `"4"`.
    #[error("invalid plan type: {0}")]
    InvalidPlan(String),

    /// Unrecognized gender.
    #[error("invalid gender: {0}")]
    InvalidGender(String),

    /// Unrecognized status or tag string read back from storage.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
