//! Shared value types for the commerce core.
//!
//! This crate provides the identifier newtypes, the `Money` type (integer
//! paise), and the `Principal` passed explicitly into every operation.

pub mod ids;
pub mod money;
pub mod principal;

pub use ids::{CartItemId, CustomOrderId, CustomerId, OrderId, ProductId, StaffId};
pub use money::Money;
pub use principal::Principal;
