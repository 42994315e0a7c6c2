//! Cart storage.

use async_trait::async_trait;
use common::{CartItemId, CustomerId};
use domain::CartItem;

use crate::Result;

/// Storage for cart lines.
///
/// Lines are exclusively owned per customer and never contended across
/// users; every mutation is persisted immediately so the cart is durable
/// across sessions.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns all lines in a customer's cart.
    async fn cart_items(&self, customer: CustomerId) -> Result<Vec<CartItem>>;

    /// Fetches a single line.
    async fn get_cart_item(&self, id: CartItemId) -> Result<CartItem>;

    /// Inserts a new line or replaces the line with the same ID.
    async fn upsert_cart_item(&self, item: &CartItem) -> Result<()>;

    /// Removes a line.
    async fn remove_cart_item(&self, id: CartItemId) -> Result<()>;

    /// Removes every line in a customer's cart.
    async fn clear_cart(&self, customer: CustomerId) -> Result<()>;
}
