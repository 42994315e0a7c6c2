//! Checkout integration tests against the in-memory store.

use commerce::{CartService, CheckoutService, CommerceConfig, CommerceError, PosLine};
use common::{CustomerId, Money, Principal, ProductId, StaffId};
use domain::{Address, MovementType, OrderSource, OrderStatus, PaymentMethod, PaymentStatus};
use store::{InventoryStore, MemoryStore, OrderStore, ProductStore, StoreError};

fn address() -> Address {
    Address {
        line1: "14 Gandhi Road".to_string(),
        line2: None,
        city: "Jaipur".to_string(),
        state: "Rajasthan".to_string(),
        pincode: "302001".to_string(),
    }
}

async fn seed(store: &MemoryStore, sku: &str, price_rupees: i64, qty: i64) -> ProductId {
    let product = domain::Product::new(sku, format!("{sku} item"), Money::from_rupees(price_rupees));
    let id = product.id.clone();
    store.insert_product(&product, qty).await.unwrap();
    id
}

fn services(store: &MemoryStore) -> (CartService<MemoryStore>, CheckoutService<MemoryStore>) {
    (
        CartService::new(store.clone()),
        CheckoutService::new(store.clone(), CommerceConfig::default()),
    )
}

#[tokio::test]
async fn reference_checkout_scenario() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;
    let b = seed(&store, "SKU-B", 1500, 3).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 2).await.unwrap();
    cart.add(principal, &b, None, 1).await.unwrap();

    let placed = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap();

    // ₹2500 subtotal, 5% tax, free shipping above ₹1000.
    assert_eq!(placed.order.subtotal, Money::from_rupees(2500));
    assert_eq!(placed.order.tax, Money::from_rupees(125));
    assert_eq!(placed.order.shipping, Money::zero());
    assert_eq!(placed.order.total, Money::from_rupees(2625));
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.source, OrderSource::Web);
    assert_eq!(placed.items.len(), 2);

    // Stock committed and logged.
    let record = store.get_inventory(&a).await.unwrap();
    assert_eq!(record.quantity, 3);
    assert_eq!(record.reserved_quantity, 0);
    let movements = store.movements_for(&a).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Sale);
    assert_eq!(movements[0].delta, -2);

    // Cart consumed.
    assert!(cart.items(principal).await.unwrap().is_empty());

    // Stored header matches what was returned.
    let stored = store.get_order(placed.order.id).await.unwrap();
    assert_eq!(stored.total, Money::from_rupees(2625));
}

#[tokio::test]
async fn stale_cart_surfaces_every_shortfall_and_touches_nothing() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;
    let b = seed(&store, "SKU-B", 1500, 2).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 4).await.unwrap();
    cart.add(principal, &b, None, 2).await.unwrap();

    // Stock moved under the cart: a staff adjustment and another sale.
    store.adjust(&a, -3, "recount").await.unwrap();
    store.reserve(&b, 1).await.unwrap();
    store.commit(&b, 1, "other order").await.unwrap();

    let err = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap_err();

    match err {
        CommerceError::StockConflict { lines } => {
            assert_eq!(lines.len(), 2);
            assert!(lines.iter().any(|l| l.product_id == a && l.available == 2));
            assert!(lines.iter().any(|l| l.product_id == b && l.available == 1));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Cart untouched, no order, no reservations taken.
    assert_eq!(cart.items(principal).await.unwrap().len(), 2);
    assert_eq!(store.order_count().await, 0);
    assert_eq!(store.get_inventory(&a).await.unwrap().reserved_quantity, 0);
}

#[tokio::test]
async fn concurrent_checkouts_cannot_oversell() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 3).await;
    let asha = Principal::customer(CustomerId::new());
    let meera = Principal::customer(CustomerId::new());

    cart.add(asha, &a, None, 2).await.unwrap();
    cart.add(meera, &a, None, 2).await.unwrap();

    let (first, second) = tokio::join!(
        checkout.checkout(asha, "Asha", address(), PaymentMethod::Prepaid, Money::zero()),
        checkout.checkout(meera, "Meera", address(), PaymentMethod::Prepaid, Money::zero()),
    );

    assert!(
        first.is_ok() != second.is_ok(),
        "exactly one checkout must win"
    );
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(
        loser.unwrap_err(),
        CommerceError::Store(StoreError::InsufficientStock { .. })
            | CommerceError::StockConflict { .. }
    ));

    let record = store.get_inventory(&a).await.unwrap();
    assert_eq!(record.quantity, 1);
    assert_eq!(record.reserved_quantity, 0);
    assert!(record.is_consistent());
    assert_eq!(store.order_count().await, 1);
}

#[tokio::test]
async fn order_creation_failure_releases_reservations() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 2).await.unwrap();
    store.set_fail_on_insert_order(true).await;

    let err = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Store(StoreError::Unavailable(_))
    ));

    // Reservations rolled back, nothing sold, cart intact.
    let record = store.get_inventory(&a).await.unwrap();
    assert_eq!(record.quantity, 5);
    assert_eq!(record.reserved_quantity, 0);
    assert_eq!(store.order_count().await, 0);
    assert_eq!(store.movement_count().await, 0);
    assert_eq!(cart.items(principal).await.unwrap().len(), 1);
}

#[tokio::test]
async fn commit_failure_cancels_the_order_and_restores_stock() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 2).await.unwrap();
    store.set_fail_on_commit(true).await;

    let err = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Store(StoreError::Unavailable(_))
    ));

    let record = store.get_inventory(&a).await.unwrap();
    assert_eq!(record.quantity, 5);
    assert_eq!(record.reserved_quantity, 0);
    assert_eq!(cart.items(principal).await.unwrap().len(), 1);
}

#[tokio::test]
async fn order_items_keep_their_price_snapshot() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 1).await.unwrap();
    let placed = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap();

    store.update_price(&a, Money::from_rupees(900)).await.unwrap();

    let items = store.order_items(placed.order.id).await.unwrap();
    assert_eq!(items[0].unit_price, Money::from_rupees(500));
}

#[tokio::test]
async fn cod_adds_the_surcharge() {
    let store = MemoryStore::new();
    let (cart, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 2500, 5).await;
    let principal = Principal::customer(CustomerId::new());

    cart.add(principal, &a, None, 1).await.unwrap();
    let placed = checkout
        .checkout(
            principal,
            "Asha",
            address(),
            PaymentMethod::CashOnDelivery,
            Money::zero(),
        )
        .await
        .unwrap();

    assert_eq!(placed.order.cod_surcharge, Money::from_rupees(50));
    assert_eq!(placed.order.total, Money::from_rupees(2675));
    assert_eq!(placed.order.payment_method, PaymentMethod::CashOnDelivery);
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let store = MemoryStore::new();
    let (_, checkout) = services(&store);
    let principal = Principal::customer(CustomerId::new());

    let err = checkout
        .checkout(principal, "Asha", address(), PaymentMethod::Prepaid, Money::zero())
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart));
}

#[tokio::test]
async fn pos_sale_is_staff_only_and_skips_shipping() {
    let store = MemoryStore::new();
    let (_, checkout) = services(&store);
    let a = seed(&store, "SKU-A", 500, 5).await;

    let lines = vec![PosLine {
        product_id: a.clone(),
        variant: None,
        quantity: 1,
    }];

    let err = checkout
        .pos_sale(
            Principal::customer(CustomerId::new()),
            "Walk-in",
            &lines,
            PaymentMethod::Prepaid,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::StaffRequired));

    let staff = Principal::staff(StaffId::new());
    let placed = checkout
        .pos_sale(staff, "Walk-in", &lines, PaymentMethod::Prepaid)
        .await
        .unwrap();

    // ₹500 is under the free-shipping threshold, but counter sales never
    // ship.
    assert_eq!(placed.order.shipping, Money::zero());
    assert_eq!(placed.order.total, Money::from_rupees(525));
    assert_eq!(placed.order.source, OrderSource::Pos);
    assert_eq!(placed.order.customer_id, None);
    assert_eq!(placed.order.payment_status, PaymentStatus::Paid);

    let record = store.get_inventory(&a).await.unwrap();
    assert_eq!(record.quantity, 4);
    assert_eq!(record.reserved_quantity, 0);
}
