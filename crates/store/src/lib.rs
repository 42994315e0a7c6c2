//! Transactional persistence boundary for the commerce core.
//!
//! The services above this crate never touch storage directly; they speak
//! to the traits here. Two implementations ship:
//! - [`MemoryStore`]: a single-lock in-memory store for tests and demos
//! - [`PostgresStore`]: the production store on sqlx
//!
//! All atomicity guarantees live behind these traits: the reservation
//! guard is one conditional update, quantity changes are paired with their
//! movement rows in one transaction, order + items creation is one
//! transaction, and ledger postings pair the transaction row with the
//! denormalized balance update.

pub mod cart;
pub mod catalog;
pub mod custom_orders;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod memory;
pub mod orders;
pub mod postgres;

pub use cart::CartStore;
pub use catalog::ProductStore;
pub use custom_orders::CustomOrderStore;
pub use error::{Result, StoreError};
pub use inventory::InventoryStore;
pub use ledger::LedgerStore;
pub use memory::MemoryStore;
pub use orders::OrderStore;
pub use postgres::PostgresStore;
