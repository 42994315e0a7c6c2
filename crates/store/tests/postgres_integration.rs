//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container and run serially, each
//! against truncated tables.

use std::sync::Arc;

use common::{CustomerId, Money, ProductId};
use domain::{
    CartItem, CustomOrder, CustomOrderMessage, LoyaltyKind, MovementType, Order, OrderItem,
    OrderSource, OrderStatus, PaymentMethod, PaymentStatus, Product, StatusHistoryEntry,
    WalletKind,
    pricing::{CheckoutTotals, PricingRules},
};
use sqlx::PgPool;
use store::{
    CartStore, CustomOrderStore, InventoryStore, LedgerStore, OrderStore, PostgresStore,
    ProductStore, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use serial_test::serial;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_commerce_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query(
        "TRUNCATE TABLE cart_items, order_items, orders, stock_movements, inventory, products, \
         custom_order_images, custom_order_messages, custom_order_status_history, custom_orders, \
         loyalty_transactions, wallet_transactions, customers",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

async fn seed_product(store: &PostgresStore, sku: &str, qty: i64) -> ProductId {
    let product = Product::new(sku, "Block Print Stole", Money::from_rupees(500));
    store.insert_product(&product, qty).await.unwrap();
    product.id
}

fn web_order(customer: CustomerId, subtotal: Money) -> Order {
    let totals = CheckoutTotals::compute(subtotal, Money::zero(), false, &PricingRules::default());
    Order::new(
        Some(customer),
        "Asha",
        None,
        totals,
        PaymentMethod::Prepaid,
        OrderSource::Web,
    )
}

#[tokio::test]
#[serial]
async fn product_and_inventory_created_together() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 7).await;

    let product = store.get_product(&id).await.unwrap();
    assert_eq!(product.name, "Block Print Stole");

    let record = store.get_inventory(&id).await.unwrap();
    assert_eq!(record.quantity, 7);
    assert_eq!(record.reserved_quantity, 0);
}

#[tokio::test]
#[serial]
async fn reserve_guard_rejects_oversell() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;

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

    let record = store.get_inventory(&id).await.unwrap();
    assert_eq!(record.reserved_quantity, 3);
}

#[tokio::test]
#[serial]
async fn commit_writes_sale_movement_atomically() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;

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
#[serial]
async fn release_clamps_at_zero() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;

    store.reserve(&id, 2).await.unwrap();
    store.release(&id, 5).await.unwrap();
    store.release(&id, 5).await.unwrap();

    let record = store.get_inventory(&id).await.unwrap();
    assert_eq!(record.reserved_quantity, 0);
    assert_eq!(record.quantity, 5);
}

#[tokio::test]
#[serial]
async fn restock_and_adjust_log_movements() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 10).await;

    store.restock(&id, 5, "new batch").await.unwrap();
    store.adjust(&id, -3, "damaged in storage").await.unwrap();

    let record = store.get_inventory(&id).await.unwrap();
    assert_eq!(record.quantity, 12);

    let movements = store.movements_for(&id).await.unwrap();
    let sum: i64 = movements.iter().map(|m| m.delta).sum();
    assert_eq!(sum, record.quantity - 10);
}

#[tokio::test]
#[serial]
async fn adjust_cannot_undercut_reservations() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;

    store.reserve(&id, 4).await.unwrap();

    let err = store.adjust(&id, -2, "recount").await.unwrap_err();
    assert!(matches!(err, StoreError::InsufficientStock { .. }));

    let record = store.get_inventory(&id).await.unwrap();
    assert_eq!(record.quantity, 5);
    assert!(store.movements_for(&id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn cart_roundtrip_and_clear() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;
    let customer = CustomerId::new();

    let item = CartItem::new(customer, id.clone(), Some("M".to_string()), 2);
    store.upsert_cart_item(&item).await.unwrap();

    let mut updated = store.get_cart_item(item.id).await.unwrap();
    assert_eq!(updated.quantity, 2);

    updated.quantity = 4;
    store.upsert_cart_item(&updated).await.unwrap();

    let items = store.cart_items(customer).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 4);

    store.clear_cart(customer).await.unwrap();
    assert!(store.cart_items(customer).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn order_inserted_with_items() {
    let store = get_test_store().await;
    let id = seed_product(&store, "SKU-001", 5).await;
    let customer = CustomerId::new();

    let order = web_order(customer, Money::from_rupees(1000));
    let items = vec![OrderItem::new(
        order.id,
        id,
        "Block Print Stole",
        None,
        2,
        Money::from_rupees(500),
    )];
    store.insert_order(&order, &items).await.unwrap();

    let stored = store.get_order(order.id).await.unwrap();
    assert_eq!(stored.customer_id, Some(customer));
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total, order.total);

    let stored_items = store.order_items(order.id).await.unwrap();
    assert_eq!(stored_items.len(), 1);
    assert_eq!(stored_items[0].unit_price, Money::from_rupees(500));
}

#[tokio::test]
#[serial]
async fn order_status_updates_persist() {
    let store = get_test_store().await;
    let customer = CustomerId::new();

    let order = web_order(customer, Money::from_rupees(1000));
    store.insert_order(&order, &[]).await.unwrap();

    store
        .update_order_status(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    store
        .update_payment_status(order.id, PaymentStatus::Paid)
        .await
        .unwrap();

    let stored = store.get_order(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
#[serial]
async fn orders_for_customer_newest_first() {
    let store = get_test_store().await;
    let customer = CustomerId::new();

    let first = web_order(customer, Money::from_rupees(1000));
    store.insert_order(&first, &[]).await.unwrap();
    let second = web_order(customer, Money::from_rupees(2000));
    store.insert_order(&second, &[]).await.unwrap();

    let orders = store.orders_for_customer(customer).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders[0].created_at >= orders[1].created_at);
}

#[tokio::test]
#[serial]
async fn custom_order_status_carries_history() {
    let store = get_test_store().await;
    let customer = CustomerId::new();

    let mut request = CustomOrder::new(
        customer,
        "Bridal dupatta",
        "Hand-embroidered, red and gold",
        Money::from_rupees(3000),
        Money::from_rupees(5000),
        "8 weeks",
    );
    let submitted = StatusHistoryEntry::new(request.id, request.status, None, "customer");
    store.insert_custom_order(&request, &submitted).await.unwrap();

    request.apply_status(domain::CustomOrderStatus::InDiscussion, chrono::Utc::now());
    let entry = StatusHistoryEntry::new(
        request.id,
        request.status,
        Some("Discussed motifs on call".to_string()),
        "staff",
    );
    store.update_status(&request, &entry).await.unwrap();

    let stored = store.get_custom_order(request.id).await.unwrap();
    assert_eq!(stored.status, domain::CustomOrderStatus::InDiscussion);
    assert!(stored.discussion_started_at.is_some());

    let history = store.status_history(request.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, domain::CustomOrderStatus::Submitted);
    assert_eq!(history[1].status, domain::CustomOrderStatus::InDiscussion);

    store
        .append_message(&CustomOrderMessage::new(
            request.id,
            "staff",
            "Sharing two motif options shortly.",
        ))
        .await
        .unwrap();
    assert_eq!(store.messages(request.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn ledger_postings_reconcile() {
    let store = get_test_store().await;
    let customer = CustomerId::new();

    store
        .post_loyalty(customer, LoyaltyKind::Earn, 26, "order-1")
        .await
        .unwrap();
    store
        .post_loyalty(customer, LoyaltyKind::Redeem, 10, "discount")
        .await
        .unwrap();
    store
        .post_wallet(customer, WalletKind::Credit, Money::from_rupees(500), "top-up")
        .await
        .unwrap();

    let balances = store.balances(customer).await.unwrap();
    assert_eq!(balances.loyalty_points, 16);
    assert_eq!(balances.wallet_balance, Money::from_rupees(500));

    let sum: i64 = store
        .loyalty_history(customer)
        .await
        .unwrap()
        .iter()
        .map(|t| t.signed_points())
        .sum();
    assert_eq!(sum, balances.loyalty_points);
}

#[tokio::test]
#[serial]
async fn overdraw_leaves_no_ledger_row() {
    let store = get_test_store().await;
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

    let balances = store.balances(customer).await.unwrap();
    assert_eq!(balances.wallet_balance, Money::from_rupees(300));
    assert_eq!(store.wallet_history(customer).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn unknown_customer_has_zero_balances() {
    let store = get_test_store().await;

    let balances = store.balances(CustomerId::new()).await.unwrap();
    assert_eq!(balances.loyalty_points, 0);
    assert_eq!(balances.wallet_balance, Money::zero());
}
