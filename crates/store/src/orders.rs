//! Order storage.

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::{Order, OrderItem, OrderStatus, PaymentStatus};

use crate::Result;

/// Storage for orders and their immutable item snapshots.
///
/// The header and its items are written in one transaction and are
/// append-only afterwards; only the two status columns ever change, and
/// only the order state machine calls those updates.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order header with all of its items, atomically.
    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()>;

    /// Fetches an order header.
    async fn get_order(&self, id: OrderId) -> Result<Order>;

    /// Returns the item snapshots under an order.
    async fn order_items(&self, id: OrderId) -> Result<Vec<OrderItem>>;

    /// Writes a validated fulfillment status.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()>;

    /// Writes a validated payment status.
    async fn update_payment_status(&self, id: OrderId, status: PaymentStatus) -> Result<()>;

    /// Returns a customer's orders, newest first.
    async fn orders_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>>;
}
