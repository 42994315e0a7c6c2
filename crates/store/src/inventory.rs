//! Stock ledger storage.

use async_trait::async_trait;
use common::ProductId;
use domain::{InventoryRecord, StockMovement};

use crate::Result;

/// The authoritative stock ledger.
///
/// `available = quantity - reserved_quantity` is the only number safe to
/// sell against. Every operation that changes `quantity` writes its
/// movement row in the same transaction; failure to write the movement
/// fails the whole operation.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fetches the stock counts for a product.
    async fn get_inventory(&self, id: &ProductId) -> Result<InventoryRecord>;

    /// Pure read: returns true if `requested` units are available right
    /// now. Advisory only; checkout re-validates and reserves.
    async fn check_available(&self, id: &ProductId, requested: i64) -> Result<bool> {
        Ok(self.get_inventory(id).await?.can_fulfill(requested))
    }

    /// Takes a reservation against available stock.
    ///
    /// Implemented as a single atomic conditional update
    /// (`reserved_quantity += qty` guarded by `reserved_quantity + qty <=
    /// quantity`), never a check-then-write across two round trips: two
    /// simultaneous reservations cannot both succeed when only one unit is
    /// available. Fails with [`crate::StoreError::InsufficientStock`].
    async fn reserve(&self, id: &ProductId, qty: u32) -> Result<()>;

    /// Finalizes a sale: decrements `quantity` and `reserved_quantity`
    /// together and appends a `sale` movement, atomically.
    async fn commit(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()>;

    /// Releases a reservation without touching on-hand stock.
    ///
    /// Clamped at zero so a duplicated rollback is a no-op, not an error.
    /// No movement row is written because `quantity` is untouched.
    async fn release(&self, id: &ProductId, qty: u32) -> Result<()>;

    /// Adds goods to saleable stock, appending a `restock` movement
    /// atomically.
    async fn restock(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()>;

    /// Staff manual correction, appending an `adjustment` movement
    /// atomically. Guarded so the reservation bounds invariant holds.
    async fn adjust(&self, id: &ProductId, delta: i64, reference: &str) -> Result<()>;

    /// Returns the movement log for a product, oldest first.
    async fn movements_for(&self, id: &ProductId) -> Result<Vec<StockMovement>>;
}
