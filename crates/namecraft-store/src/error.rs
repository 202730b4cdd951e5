//! Error types for namecraft storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found, or not owned by the caller.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Insufficient credits for a debit.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Duplicate event (idempotency check failed).
    #[error("duplicate event: {event_id}")]
    DuplicateEvent {
        /// The event ID that was duplicated.
        event_id: String,
    },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<namecraft_core::CoreError> for StoreError {
    fn from(err: namecraft_core::CoreError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<namecraft_core::IdError> for StoreError {
    fn from(err: namecraft_core::IdError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for StoreError {
    fn from(err: chrono::ParseError) -> Self {
        Self::Serialization(err.to_string())
    }
}
