//! Commerce service error types.

use common::{Money, ProductId};
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// One offending cart line in a [`CommerceError::StockConflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    /// The product that cannot be fulfilled.
    pub product_id: ProductId,

    /// How many units the cart asked for.
    pub requested: i64,

    /// How many are actually available.
    pub available: i64,
}

/// Errors that can occur during commerce operations.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The operation needs a signed-in customer.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The operation is staff-only.
    #[error("staff access required")]
    StaffRequired,

    /// The product is inactive or archived and cannot be sold.
    #[error("product not available for sale: {0}")]
    ProductUnavailable(ProductId),

    /// A cart mutation asked for more than is available right now.
    #[error("out of stock for {product}: requested {requested}, available {available}")]
    OutOfStock {
        product: ProductId,
        requested: i64,
        available: i64,
    },

    /// Checkout revalidation found stale cart lines. Lists every offending
    /// line so the customer can fix the whole cart in one pass.
    #[error("{} cart line(s) exceed available stock", lines.len())]
    StockConflict { lines: Vec<StockShortage> },

    /// Checkout on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The customer's wallet cannot cover the requested debit.
    #[error("wallet balance too low: requested {requested}, available {available}")]
    WalletBalanceTooLow { requested: Money, available: Money },

    /// A rollback step failed after an earlier step had failed. The system
    /// may hold stale reservations; manual reconciliation is required.
    #[error("compensation failed during {operation}: {reason}")]
    CompensationFailed { operation: &'static str, reason: String },

    /// Domain validation error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;
