//! Domain layer for the commerce core.
//!
//! This crate holds the record types and state machines with no IO:
//! - Product catalog and inventory records with the stock movement log types
//! - Cart lines
//! - Order header/items with the order and payment state machines
//! - Custom-order requests with their longer-lived state machine
//! - Loyalty and wallet ledger transaction types
//! - Checkout totals computation

pub mod cart;
pub mod custom_order;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod order;
pub mod pricing;
pub mod product;

pub use cart::CartItem;
pub use custom_order::{
    CustomOrder, CustomOrderImage, CustomOrderMessage, CustomOrderStatus, StatusHistoryEntry,
};
pub use error::DomainError;
pub use inventory::{InventoryRecord, MovementType, StockMovement};
pub use ledger::{
    CustomerBalances, LoyaltyKind, LoyaltyTransaction, WalletKind, WalletTransaction,
};
pub use order::{
    Address, Order, OrderItem, OrderSource, OrderStatus, PaymentMethod, PaymentStatus,
};
pub use pricing::{CheckoutTotals, PricingRules};
pub use product::{Product, ProductStatus};
