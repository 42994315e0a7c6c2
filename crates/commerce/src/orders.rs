//! Order fulfillment state machine.

use common::{CustomerId, OrderId, Principal};
use domain::{Order, OrderItem, OrderStatus, PaymentStatus};
use store::{InventoryStore, LedgerStore, OrderStore};

use crate::config::CommerceConfig;
use crate::error::{CommerceError, Result};
use crate::ledger::LedgerService;

/// Staff-driven order lifecycle operations.
///
/// Fulfillment (`pending → confirmed → processing → ready → delivered`,
/// `cancelled` from any non-terminal state) and payment are two separate
/// axes, each validated by the domain state machine before any write.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
    ledger: LedgerService<S>,
    config: CommerceConfig,
}

impl<S> OrderService<S>
where
    S: OrderStore + InventoryStore + LedgerStore + Clone,
{
    /// Creates an order service over a store.
    pub fn new(store: S, config: CommerceConfig) -> Self {
        let ledger = LedgerService::new(store.clone());
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Fetches an order header.
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        Ok(self.store.get_order(id).await?)
    }

    /// Returns the item snapshots under an order.
    pub async fn order_items(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self.store.order_items(id).await?)
    }

    /// Returns a customer's orders, newest first.
    pub async fn orders_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>> {
        Ok(self.store.orders_for_customer(customer).await?)
    }

    /// Moves an order to `next`, enforcing single forward steps.
    ///
    /// Cancellation returns the goods: each line gets a `restock` movement
    /// referencing the order (the sale already decremented on-hand stock at
    /// checkout). Delivery awards loyalty points to the purchasing
    /// customer.
    #[tracing::instrument(skip(self))]
    pub async fn transition(
        &self,
        principal: Principal,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }

        let mut order = self.store.get_order(id).await?;
        order.validate_transition(next)?;
        self.store.update_order_status(id, next).await?;
        let from = order.status;
        order.status = next;

        metrics::counter!("order_transitions_total").increment(1);
        tracing::info!(order = %id, from = from.as_str(), to = next.as_str(), "order transition");

        match next {
            OrderStatus::Cancelled => self.return_goods(&order).await?,
            OrderStatus::Delivered => self.award_points(&order).await?,
            _ => {}
        }

        Ok(order)
    }

    /// Moves the payment axis, independently of fulfillment.
    #[tracing::instrument(skip(self))]
    pub async fn set_payment_status(
        &self,
        principal: Principal,
        id: OrderId,
        next: PaymentStatus,
    ) -> Result<Order> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }

        let mut order = self.store.get_order(id).await?;
        order.validate_payment_transition(next)?;
        self.store.update_payment_status(id, next).await?;
        order.payment_status = next;
        Ok(order)
    }

    async fn return_goods(&self, order: &Order) -> Result<()> {
        let reference = format!("order {} cancelled", order.id);
        for item in self.store.order_items(order.id).await? {
            // Checkout already committed this order's reservation, so the
            // order holds none. Reservations are a per-product pool; any
            // units reserved now belong to in-flight checkouts and must
            // not be released here.
            self.store
                .restock(&item.product_id, item.quantity, &reference)
                .await?;
        }
        Ok(())
    }

    async fn award_points(&self, order: &Order) -> Result<()> {
        // Walk-in POS sales have no customer account to credit.
        let Some(customer) = order.customer_id else {
            return Ok(());
        };
        let points = self.config.points_for(order.total);
        if points == 0 {
            return Ok(());
        }
        let reference = format!("order {} delivered", order.id);
        self.ledger
            .award_delivery_points(customer, points, &reference)
            .await?;
        Ok(())
    }
}
