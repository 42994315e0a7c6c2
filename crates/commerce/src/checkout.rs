//! Checkout: the order assembler.
//!
//! Checkout spans several store writes that cannot share one transaction,
//! so it runs a manual compensation protocol:
//!
//! 1. revalidate every cart line, collecting all shortfalls
//! 2. reserve each line (release prior reservations on failure)
//! 3. create the order header + item snapshots atomically
//!    (release everything on failure)
//! 4. commit each reservation to a sale
//!    (restock committed lines, release the rest, cancel the order on failure)
//! 5. clear the checked-out cart lines
//!
//! A failed rollback step is surfaced as
//! [`CommerceError::CompensationFailed`]; that is the one state needing
//! manual reconciliation.

use common::{Money, Principal, ProductId};
use domain::{
    Address, CheckoutTotals, DomainError, Order, OrderItem, OrderSource, OrderStatus,
    PaymentMethod, PaymentStatus,
};
use store::{CartStore, InventoryStore, OrderStore, ProductStore, StoreError};

use crate::config::CommerceConfig;
use crate::error::{CommerceError, Result, StockShortage};

/// A successfully placed order with its item snapshots.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One line of a staff point-of-sale sale.
#[derive(Debug, Clone)]
pub struct PosLine {
    pub product_id: ProductId,
    pub variant: Option<String>,
    pub quantity: u32,
}

/// Turns carts (or POS lines) into immutable orders.
#[derive(Clone)]
pub struct CheckoutService<S> {
    store: S,
    config: CommerceConfig,
}

impl<S> CheckoutService<S>
where
    S: CartStore + InventoryStore + OrderStore + ProductStore,
{
    /// Creates a checkout service over a store.
    pub fn new(store: S, config: CommerceConfig) -> Self {
        Self { store, config }
    }

    /// Checks out the caller's cart into an order.
    ///
    /// On [`CommerceError::StockConflict`] the cart is left untouched and
    /// no order exists; every offending line is listed so the customer can
    /// fix the whole cart in one pass.
    #[tracing::instrument(skip(self, address))]
    pub async fn checkout(
        &self,
        principal: Principal,
        customer_name: &str,
        address: Address,
        payment_method: PaymentMethod,
        discount: Money,
    ) -> Result<PlacedOrder> {
        metrics::counter!("checkouts_total").increment(1);
        let started = std::time::Instant::now();

        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;

        let lines = self.store.cart_items(customer).await?;
        if lines.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        // Revalidate the whole cart first. Collecting every shortfall (not
        // just the first) is what lets the customer repair stale lines in
        // one pass.
        let mut shortages = Vec::new();
        let mut items = Vec::new();
        let mut subtotal = Money::zero();
        let order_id = common::OrderId::new();
        for line in &lines {
            let product = self.store.get_product(&line.product_id).await?;
            let record = self.store.get_inventory(&line.product_id).await?;
            if !record.can_fulfill(line.quantity as i64) {
                shortages.push(StockShortage {
                    product_id: line.product_id.clone(),
                    requested: line.quantity as i64,
                    available: record.available(),
                });
                continue;
            }
            subtotal += product.price.multiply(line.quantity);
            items.push(OrderItem::new(
                order_id,
                line.product_id.clone(),
                product.name,
                line.variant.clone(),
                line.quantity,
                product.price,
            ));
        }
        if !shortages.is_empty() {
            metrics::counter!("checkout_conflicts_total").increment(1);
            tracing::info!(lines = shortages.len(), "checkout rejected on stale cart");
            return Err(CommerceError::StockConflict { lines: shortages });
        }

        let cash_on_delivery = payment_method == PaymentMethod::CashOnDelivery;
        let totals =
            CheckoutTotals::compute(subtotal, discount, cash_on_delivery, &self.config.pricing);
        let mut order = Order::new(
            Some(customer),
            customer_name,
            Some(address),
            totals,
            payment_method,
            OrderSource::Web,
        );
        order.id = order_id;

        self.assemble(&order, &items).await?;

        // The order exists; the cart lines it consumed go away. Lines added
        // mid-checkout by another tab survive.
        for line in &lines {
            self.store.remove_cart_item(line.id).await?;
        }

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        Ok(PlacedOrder { order, items })
    }

    /// Staff point-of-sale sale: same reserve, create, commit protocol as
    /// checkout, without a cart. Goods change hands over the counter, so
    /// there is no shipping and no surcharge, and payment completes
    /// immediately.
    #[tracing::instrument(skip(self, lines))]
    pub async fn pos_sale(
        &self,
        principal: Principal,
        customer_name: &str,
        lines: &[PosLine],
        payment_method: PaymentMethod,
    ) -> Result<PlacedOrder> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }
        if lines.is_empty() {
            return Err(DomainError::EmptyOrder.into());
        }

        let order_id = common::OrderId::new();
        let mut subtotal = Money::zero();
        let mut items = Vec::new();
        for line in lines {
            if line.quantity < 1 {
                return Err(DomainError::InvalidQuantity(line.quantity as i64).into());
            }
            let product = self.store.get_product(&line.product_id).await?;
            subtotal += product.price.multiply(line.quantity);
            items.push(OrderItem::new(
                order_id,
                line.product_id.clone(),
                product.name,
                line.variant.clone(),
                line.quantity,
                product.price,
            ));
        }

        let tax = subtotal.apply_bps(self.config.pricing.tax_rate_bps);
        let totals = CheckoutTotals {
            subtotal,
            discount: Money::zero(),
            tax,
            shipping: Money::zero(),
            cod_surcharge: Money::zero(),
            total: subtotal + tax,
        };

        let mut order = Order::new(
            None,
            customer_name,
            None,
            totals,
            payment_method,
            OrderSource::Pos,
        );
        order.id = order_id;

        self.assemble(&order, &items).await?;

        self.store
            .update_payment_status(order.id, PaymentStatus::Paid)
            .await?;
        order.payment_status = PaymentStatus::Paid;

        Ok(PlacedOrder { order, items })
    }

    /// Reserve, create, commit. Each failure path unwinds everything done
    /// so far before propagating.
    async fn assemble(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let reference = order.id.to_string();

        let mut reserved: Vec<&OrderItem> = Vec::new();
        for item in items {
            if let Err(err) = self.store.reserve(&item.product_id, item.quantity).await {
                self.release_all(&reserved).await?;
                return Err(err.into());
            }
            reserved.push(item);
        }

        if let Err(err) = self.store.insert_order(order, items).await {
            tracing::warn!(order = %order.id, %err, "order creation failed, releasing reservations");
            self.release_all(&reserved).await?;
            return Err(err.into());
        }

        let mut committed: Vec<&OrderItem> = Vec::new();
        for item in items {
            if let Err(err) = self
                .store
                .commit(&item.product_id, item.quantity, &reference)
                .await
            {
                tracing::warn!(order = %order.id, %err, "partial commit, rolling order back");
                self.undo_partial_commit(order, items, committed.len()).await?;
                return Err(err.into());
            }
            committed.push(item);
        }

        Ok(())
    }

    /// Releases a set of reservations, mapping any failure to the fatal
    /// [`CommerceError::CompensationFailed`].
    async fn release_all(&self, reserved: &[&OrderItem]) -> Result<()> {
        metrics::counter!("compensations_total").increment(1);
        for item in reserved {
            self.store
                .release(&item.product_id, item.quantity)
                .await
                .map_err(|err| compensation_failed("reservation release", err))?;
        }
        Ok(())
    }

    /// Unwinds a partially committed order: restocks the lines already
    /// sold, releases the reservations still held, cancels the header.
    async fn undo_partial_commit(
        &self,
        order: &Order,
        items: &[OrderItem],
        committed: usize,
    ) -> Result<()> {
        metrics::counter!("compensations_total").increment(1);
        let reference = format!("order {} rolled back", order.id);

        for item in &items[..committed] {
            self.store
                .restock(&item.product_id, item.quantity, &reference)
                .await
                .map_err(|err| compensation_failed("commit rollback", err))?;
        }
        for item in &items[committed..] {
            self.store
                .release(&item.product_id, item.quantity)
                .await
                .map_err(|err| compensation_failed("commit rollback", err))?;
        }
        self.store
            .update_order_status(order.id, OrderStatus::Cancelled)
            .await
            .map_err(|err| compensation_failed("commit rollback", err))?;
        Ok(())
    }
}

fn compensation_failed(operation: &'static str, err: StoreError) -> CommerceError {
    tracing::error!(operation, %err, "compensation failed, manual reconciliation needed");
    CommerceError::CompensationFailed {
        operation,
        reason: err.to_string(),
    }
}
