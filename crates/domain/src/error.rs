//! Domain error types.

use thiserror::Error;

/// Validation errors raised by the pure domain layer.
///
/// These are all rejected before any write occurs: a state machine or
/// field-immutability violation never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Quantity was zero or negative.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The state machine rejected an out-of-order status change.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// Attempt to alter a finalized field.
    #[error("field '{field}' is immutable once set")]
    ImmutableFieldViolation { field: &'static str },

    /// A final price was offered before the quote was accepted.
    #[error("final price can only be set at quote_accepted or later (status: {status})")]
    FinalPriceTooEarly { status: &'static str },

    /// An order must carry at least one line.
    #[error("order must contain at least one line")]
    EmptyOrder,
}

/// Result type for domain validation.
pub type Result<T> = std::result::Result<T, DomainError>;
