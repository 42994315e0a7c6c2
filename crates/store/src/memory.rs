//! In-memory store implementation for tests and demos.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CartItemId, CustomOrderId, CustomerId, Money, OrderId, ProductId};
use domain::{
    CartItem, CustomOrder, CustomOrderImage, CustomOrderMessage, CustomerBalances,
    InventoryRecord, LoyaltyKind, LoyaltyTransaction, MovementType, Order, OrderItem, OrderStatus,
    PaymentStatus, Product, ProductStatus, StatusHistoryEntry, StockMovement, WalletKind,
    WalletTransaction,
};
use tokio::sync::RwLock;

use crate::{
    CartStore, CustomOrderStore, InventoryStore, LedgerStore, OrderStore, ProductStore, Result,
    StoreError,
};

#[derive(Default)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    inventory: HashMap<ProductId, InventoryRecord>,
    movements: Vec<StockMovement>,
    cart: HashMap<CartItemId, CartItem>,
    orders: HashMap<OrderId, Order>,
    order_items: HashMap<OrderId, Vec<OrderItem>>,
    custom_orders: HashMap<CustomOrderId, CustomOrder>,
    histories: HashMap<CustomOrderId, Vec<StatusHistoryEntry>>,
    messages: HashMap<CustomOrderId, Vec<CustomOrderMessage>>,
    images: HashMap<CustomOrderId, Vec<CustomOrderImage>>,
    balances: HashMap<CustomerId, CustomerBalances>,
    loyalty: Vec<LoyaltyTransaction>,
    wallet: Vec<WalletTransaction>,
    fail_on_insert_order: bool,
    fail_on_commit: bool,
}

/// In-memory store backed by a single lock.
///
/// Every operation runs under the write lock, which gives it the same
/// atomicity the PostgreSQL implementation gets from transactions and
/// conditional updates: two concurrent reservations serialize and the
/// guard sees the first one's effect.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures order-header inserts to fail until unset. Used to test
    /// the checkout compensation protocol.
    pub async fn set_fail_on_insert_order(&self, fail: bool) {
        self.state.write().await.fail_on_insert_order = fail;
    }

    /// Configures stock commits to fail until unset.
    pub async fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().await.fail_on_commit = fail;
    }

    /// Returns the number of order headers stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the total number of stock movements recorded.
    pub async fn movement_count(&self) -> usize {
        self.state.read().await.movements.len()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product, initial_quantity: i64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .inventory
            .insert(product.id.clone(), InventoryRecord::new(product.id.clone(), initial_quantity));
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product> {
        self.state
            .read()
            .await
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn update_price(&self, id: &ProductId, price: Money) -> Result<()> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        product.price = price;
        Ok(())
    }

    async fn set_product_status(&self, id: &ProductId, status: ProductStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        product.status = status;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn get_inventory(&self, id: &ProductId) -> Result<InventoryRecord> {
        self.state
            .read()
            .await
            .inventory
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("inventory", id))
    }

    async fn reserve(&self, id: &ProductId, qty: u32) -> Result<()> {
        let qty = qty as i64;
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("inventory", id))?;

        // The guard and the increment happen under one lock: this is the
        // conditional-update equivalent of the SQL implementation.
        if record.reserved_quantity + qty > record.quantity {
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: qty,
                available: record.available(),
            });
        }
        record.reserved_quantity += qty;
        Ok(())
    }

    async fn commit(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()> {
        let qty = qty as i64;
        let mut state = self.state.write().await;
        if state.fail_on_commit {
            return Err(StoreError::Unavailable("injected commit failure".to_string()));
        }

        let record = state
            .inventory
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("inventory", id))?;
        if record.reserved_quantity < qty {
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: qty,
                available: record.reserved_quantity,
            });
        }
        record.quantity -= qty;
        record.reserved_quantity -= qty;

        state
            .movements
            .push(StockMovement::new(id.clone(), -qty, MovementType::Sale, reference));
        Ok(())
    }

    async fn release(&self, id: &ProductId, qty: u32) -> Result<()> {
        let qty = qty as i64;
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("inventory", id))?;
        // Clamped: releasing more than is reserved is a no-op remainder,
        // so duplicated rollbacks are safe.
        record.reserved_quantity -= qty.min(record.reserved_quantity);
        Ok(())
    }

    async fn restock(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()> {
        let qty = qty as i64;
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("inventory", id))?;
        record.quantity += qty;

        state
            .movements
            .push(StockMovement::new(id.clone(), qty, MovementType::Restock, reference));
        Ok(())
    }

    async fn adjust(&self, id: &ProductId, delta: i64, reference: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("inventory", id))?;

        let new_quantity = record.quantity + delta;
        if new_quantity < record.reserved_quantity || new_quantity < 0 {
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: -delta,
                available: record.available(),
            });
        }
        record.quantity = new_quantity;

        state.movements.push(StockMovement::new(
            id.clone(),
            delta,
            MovementType::Adjustment,
            reference,
        ));
        Ok(())
    }

    async fn movements_for(&self, id: &ProductId) -> Result<Vec<StockMovement>> {
        let state = self.state.read().await;
        Ok(state
            .movements
            .iter()
            .filter(|m| m.product_id == *id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn cart_items(&self, customer: CustomerId) -> Result<Vec<CartItem>> {
        let state = self.state.read().await;
        let mut items: Vec<_> = state
            .cart
            .values()
            .filter(|i| i.customer_id == customer)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.updated_at);
        Ok(items)
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<CartItem> {
        self.state
            .read()
            .await
            .cart
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("cart item", id))
    }

    async fn upsert_cart_item(&self, item: &CartItem) -> Result<()> {
        self.state.write().await.cart.insert(item.id, item.clone());
        Ok(())
    }

    async fn remove_cart_item(&self, id: CartItemId) -> Result<()> {
        self.state.write().await.cart.remove(&id);
        Ok(())
    }

    async fn clear_cart(&self, customer: CustomerId) -> Result<()> {
        self.state
            .write()
            .await
            .cart
            .retain(|_, item| item.customer_id != customer);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_insert_order {
            return Err(StoreError::Unavailable(
                "injected order insert failure".to_string(),
            ));
        }
        state.orders.insert(order.id, order.clone());
        state.order_items.insert(order.id, items.to_vec());
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.state
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn order_items(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self
            .state
            .read()
            .await
            .order_items
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        order.status = status;
        Ok(())
    }

    async fn update_payment_status(&self, id: OrderId, status: PaymentStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        order.payment_status = status;
        Ok(())
    }

    async fn orders_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.customer_id == Some(customer))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl CustomOrderStore for MemoryStore {
    async fn insert_custom_order(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.custom_orders.insert(request.id, request.clone());
        state.histories.entry(request.id).or_default().push(history.clone());
        Ok(())
    }

    async fn get_custom_order(&self, id: CustomOrderId) -> Result<CustomOrder> {
        self.state
            .read()
            .await
            .custom_orders
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("custom order", id))
    }

    async fn update_status(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.custom_orders.contains_key(&request.id) {
            return Err(StoreError::not_found("custom order", request.id));
        }
        state.custom_orders.insert(request.id, request.clone());
        state.histories.entry(request.id).or_default().push(history.clone());
        Ok(())
    }

    async fn update_prices(&self, request: &CustomOrder) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state
            .custom_orders
            .get_mut(&request.id)
            .ok_or_else(|| StoreError::not_found("custom order", request.id))?;
        stored.estimated_price = request.estimated_price;
        stored.final_price = request.final_price;
        Ok(())
    }

    async fn append_message(&self, message: &CustomOrderMessage) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.custom_orders.contains_key(&message.custom_order_id) {
            return Err(StoreError::not_found("custom order", message.custom_order_id));
        }
        state
            .messages
            .entry(message.custom_order_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn append_image(&self, image: &CustomOrderImage) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.custom_orders.contains_key(&image.custom_order_id) {
            return Err(StoreError::not_found("custom order", image.custom_order_id));
        }
        state
            .images
            .entry(image.custom_order_id)
            .or_default()
            .push(image.clone());
        Ok(())
    }

    async fn status_history(&self, id: CustomOrderId) -> Result<Vec<StatusHistoryEntry>> {
        Ok(self
            .state
            .read()
            .await
            .histories
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn messages(&self, id: CustomOrderId) -> Result<Vec<CustomOrderMessage>> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn images(&self, id: CustomOrderId) -> Result<Vec<CustomOrderImage>> {
        Ok(self
            .state
            .read()
            .await
            .images
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn custom_orders_for_customer(&self, customer: CustomerId) -> Result<Vec<CustomOrder>> {
        let state = self.state.read().await;
        let mut requests: Vec<_> = state
            .custom_orders
            .values()
            .filter(|r| r.customer_id == customer)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn post_loyalty(
        &self,
        customer: CustomerId,
        kind: LoyaltyKind,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction> {
        let mut state = self.state.write().await;
        let balances = state.balances.entry(customer).or_default();
        let before = balances.loyalty_points;
        let after = match kind {
            LoyaltyKind::Earn => before + points,
            LoyaltyKind::Redeem => {
                if before < points {
                    return Err(StoreError::InsufficientBalance {
                        requested: points,
                        available: before,
                    });
                }
                before - points
            }
        };
        balances.loyalty_points = after;

        let txn = LoyaltyTransaction {
            id: uuid::Uuid::new_v4(),
            customer_id: customer,
            kind,
            points,
            balance_before: before,
            balance_after: after,
            reference: reference.to_string(),
            created_at: chrono::Utc::now(),
        };
        state.loyalty.push(txn.clone());
        Ok(txn)
    }

    async fn post_wallet(
        &self,
        customer: CustomerId,
        kind: WalletKind,
        amount: Money,
        reference: &str,
    ) -> Result<WalletTransaction> {
        let mut state = self.state.write().await;
        let balances = state.balances.entry(customer).or_default();
        let before = balances.wallet_balance;
        let after = match kind {
            WalletKind::Credit => before + amount,
            WalletKind::Debit => {
                if before < amount {
                    return Err(StoreError::InsufficientBalance {
                        requested: amount.paise(),
                        available: before.paise(),
                    });
                }
                before - amount
            }
        };
        balances.wallet_balance = after;

        let txn = WalletTransaction {
            id: uuid::Uuid::new_v4(),
            customer_id: customer,
            kind,
            amount,
            balance_before: before,
            balance_after: after,
            reference: reference.to_string(),
            created_at: chrono::Utc::now(),
        };
        state.wallet.push(txn.clone());
        Ok(txn)
    }

    async fn balances(&self, customer: CustomerId) -> Result<CustomerBalances> {
        Ok(self
            .state
            .read()
            .await
            .balances
            .get(&customer)
            .copied()
            .unwrap_or_default())
    }

    async fn loyalty_history(&self, customer: CustomerId) -> Result<Vec<LoyaltyTransaction>> {
        Ok(self
            .state
            .read()
            .await
            .loyalty
            .iter()
            .filter(|t| t.customer_id == customer)
            .cloned()
            .collect())
    }

    async fn wallet_history(&self, customer: CustomerId) -> Result<Vec<WalletTransaction>> {
        Ok(self
            .state
            .read()
            .await
            .wallet
            .iter()
            .filter(|t| t.customer_id == customer)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_stock(qty: i64) -> (MemoryStore, ProductId) {
        let store = MemoryStore::new();
        let product = Product::new("SKU-001", "Kantha Stole", Money::from_rupees(500));
        let id = product.id.clone();
        store.insert_product(&product, qty).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_reserve_within_available_succeeds() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(&id, 3).await.unwrap();

        let record = store.get_inventory(&id).await.unwrap();
        assert_eq!(record.quantity, 5);
        assert_eq!(record.reserved_quantity, 3);
        assert_eq!(record.available(), 2);
        assert!(record.is_consistent());
    }

    #[tokio::test]
    async fn test_reserve_beyond_available_fails() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(&id, 3).await.unwrap();

        let err = store.reserve(&id, 3).await.unwrap_err();
        match err {
            StoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_commit_decrements_both_and_logs_sale() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(&id, 2).await.unwrap();
        store.commit(&id, 2, "order-1").await.unwrap();

        let record = store.get_inventory(&id).await.unwrap();
        assert_eq!(record.quantity, 3);
        assert_eq!(record.reserved_quantity, 0);

        let movements = store.movements_for(&id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].delta, -2);
        assert_eq!(movements[0].movement_type, MovementType::Sale);
        assert_eq!(movements[0].reference, "order-1");
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(&id, 2).await.unwrap();
        store.release(&id, 2).await.unwrap();
        store.release(&id, 2).await.unwrap();

        let record = store.get_inventory(&id).await.unwrap();
        assert_eq!(record.reserved_quantity, 0);
        assert_eq!(record.available(), 5);
        assert!(record.is_consistent());
        // Releases never touch the movement log.
        assert!(store.movements_for(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_movements_reconcile_with_quantity() {
        let (store, id) = store_with_stock(10).await;
        store.reserve(&id, 4).await.unwrap();
        store.commit(&id, 4, "order-1").await.unwrap();
        store.restock(&id, 6, "new batch").await.unwrap();
        store.adjust(&id, -2, "damaged in storage").await.unwrap();

        let record = store.get_inventory(&id).await.unwrap();
        let sum: i64 = store
            .movements_for(&id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.delta)
            .sum();
        assert_eq!(sum, record.quantity - 10);
    }

    #[tokio::test]
    async fn test_adjust_cannot_break_reservation_bounds() {
        let (store, id) = store_with_stock(5).await;
        store.reserve(&id, 4).await.unwrap();

        // Dropping on-hand below the reserved count must be rejected.
        let err = store.adjust(&id, -2, "recount").await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { .. }));

        let record = store.get_inventory(&id).await.unwrap();
        assert_eq!(record.quantity, 5);
        assert!(record.is_consistent());
    }

    #[tokio::test]
    async fn test_concurrent_reserves_cannot_oversell() {
        let (store, id) = store_with_stock(3).await;

        let (a, b) = tokio::join!(store.reserve(&id, 2), store.reserve(&id, 2));
        assert!(a.is_ok() != b.is_ok(), "exactly one reservation must win");

        let record = store.get_inventory(&id).await.unwrap();
        assert_eq!(record.reserved_quantity, 2);
        assert!(record.is_consistent());
    }

    #[tokio::test]
    async fn test_loyalty_posting_keeps_running_balance() {
        let store = MemoryStore::new();
        let customer = CustomerId::new();

        let earn = store
            .post_loyalty(customer, LoyaltyKind::Earn, 26, "order-1")
            .await
            .unwrap();
        assert_eq!(earn.balance_before, 0);
        assert_eq!(earn.balance_after, 26);

        let redeem = store
            .post_loyalty(customer, LoyaltyKind::Redeem, 10, "discount")
            .await
            .unwrap();
        assert_eq!(redeem.balance_before, 26);
        assert_eq!(redeem.balance_after, 16);

        let balances = store.balances(customer).await.unwrap();
        assert_eq!(balances.loyalty_points, 16);

        let ledger_sum: i64 = store
            .loyalty_history(customer)
            .await
            .unwrap()
            .iter()
            .map(|t| t.signed_points())
            .sum();
        assert_eq!(ledger_sum, balances.loyalty_points);
    }

    #[tokio::test]
    async fn test_wallet_debit_guard() {
        let store = MemoryStore::new();
        let customer = CustomerId::new();

        store
            .post_wallet(customer, WalletKind::Credit, Money::from_rupees(300), "top-up")
            .await
            .unwrap();

        let err = store
            .post_wallet(customer, WalletKind::Debit, Money::from_rupees(500), "order")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InsufficientBalance { .. }));

        // The failed posting left neither a row nor a balance change.
        let balances = store.balances(customer).await.unwrap();
        assert_eq!(balances.wallet_balance, Money::from_rupees(300));
        assert_eq!(store.wallet_history(customer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cart_ops_are_scoped_to_customer() {
        let store = MemoryStore::new();
        let asha = CustomerId::new();
        let meera = CustomerId::new();

        let item = CartItem::new(asha, "SKU-001", None, 2);
        store.upsert_cart_item(&item).await.unwrap();
        store
            .upsert_cart_item(&CartItem::new(meera, "SKU-001", None, 1))
            .await
            .unwrap();

        store.clear_cart(asha).await.unwrap();
        assert!(store.cart_items(asha).await.unwrap().is_empty());
        assert_eq!(store.cart_items(meera).await.unwrap().len(), 1);
    }
}
