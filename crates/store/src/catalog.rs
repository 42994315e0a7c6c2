//! Product catalog storage.

use async_trait::async_trait;
use common::{Money, ProductId};
use domain::{Product, ProductStatus};

use crate::Result;

/// Storage for catalog products.
///
/// Creating a product also creates its inventory record, atomically; stock
/// never exists without a product and a product is never without stock
/// counts.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product together with its inventory record.
    ///
    /// The initial on-hand quantity is the record's starting point; it has
    /// no movement row (movement deltas sum to `quantity - initial`).
    async fn insert_product(&self, product: &Product, initial_quantity: i64) -> Result<()>;

    /// Fetches a product by SKU.
    async fn get_product(&self, id: &ProductId) -> Result<Product>;

    /// Updates the live selling price. Historical order items keep their
    /// snapshots.
    async fn update_price(&self, id: &ProductId, price: Money) -> Result<()>;

    /// Updates the lifecycle status.
    async fn set_product_status(&self, id: &ProductId, status: ProductStatus) -> Result<()>;
}
