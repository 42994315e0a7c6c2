//! Store error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The atomic reservation guard rejected the request.
    #[error("insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: i64,
        available: i64,
    },

    /// A guarded balance debit would overdraw the account.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    /// A stored value is outside the known set (bad status string, negative
    /// count). Indicates writes from outside this boundary.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backing store could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
