//! Cart line types.

use chrono::{DateTime, Utc};
use common::{CartItemId, CustomerId, ProductId};
use serde::{Deserialize, Serialize};

/// One line in a customer's cart.
///
/// Lines are owned exclusively by their customer and persisted on every
/// mutation so the cart survives across sessions. A line holds no price:
/// cart totals always use the live product price, and the permanent price
/// snapshot is taken only at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line identifier.
    pub id: CartItemId,

    /// Owning customer.
    pub customer_id: CustomerId,

    /// The product in the line.
    pub product_id: ProductId,

    /// Variant or size, if the product has them.
    pub variant: Option<String>,

    /// Requested quantity. Always at least 1.
    pub quantity: u32,

    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart line stamped with the current time.
    pub fn new(
        customer_id: CustomerId,
        product_id: impl Into<ProductId>,
        variant: Option<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id: CartItemId::new(),
            customer_id,
            product_id: product_id.into(),
            variant,
            quantity,
            updated_at: Utc::now(),
        }
    }

    /// Returns true if `other` refers to the same `(product, variant)` pair.
    pub fn same_line(&self, product_id: &ProductId, variant: Option<&str>) -> bool {
        self.product_id == *product_id && self.variant.as_deref() == variant
    }
}
