//! Storefront operations for the commerce core.
//!
//! This crate is the library surface that UI event handlers call into. It
//! owns no wire protocol: callers resolve the acting [`common::Principal`]
//! themselves and hand it into every operation.
//!
//! - [`CartService`]: advisory cart over live availability
//! - [`CheckoutService`]: turns carts and POS lines into immutable orders
//!   under the reserve, create, commit compensation protocol
//! - [`OrderService`]: the staff-driven fulfillment and payment state
//!   machines, with cancellation restock and delivery loyalty awards
//! - [`CustomOrderService`]: made-to-order requests with an audited
//!   status history
//! - [`LedgerService`]: loyalty points and wallet over append-only
//!   ledgers

pub mod cart;
pub mod checkout;
pub mod config;
pub mod custom_orders;
pub mod error;
pub mod ledger;
pub mod orders;

pub use cart::CartService;
pub use checkout::{CheckoutService, PlacedOrder, PosLine};
pub use config::CommerceConfig;
pub use custom_orders::CustomOrderService;
pub use error::{CommerceError, Result, StockShortage};
pub use ledger::LedgerService;
pub use orders::OrderService;
