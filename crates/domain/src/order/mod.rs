//! Order header and line types.

mod status;

pub use status::{OrderStatus, PaymentStatus};

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::pricing::CheckoutTotals;

/// Shipping address snapshot taken at checkout.
///
/// Later edits to the customer's saved address never alter the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid online at checkout.
    Prepaid,

    /// Cash on delivery; carries the configured surcharge.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Returns the payment method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Prepaid => "prepaid",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    /// Parses a payment method from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prepaid" => Some(PaymentMethod::Prepaid),
            "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }
}

/// Where the order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    /// The public storefront checkout.
    Web,

    /// A staff point-of-sale sale.
    Pos,
}

impl OrderSource {
    /// Returns the source as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Web => "web",
            OrderSource::Pos => "pos",
        }
    }

    /// Parses a source from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "web" => Some(OrderSource::Web),
            "pos" => Some(OrderSource::Pos),
            _ => None,
        }
    }
}

/// An immutable order header.
///
/// Created atomically with its items at checkout. Everything here is a
/// snapshot; only `status` and `payment_status` change afterwards, and only
/// through the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,

    /// The purchasing customer. None for anonymous POS walk-ins.
    pub customer_id: Option<CustomerId>,

    /// Customer name snapshot.
    pub customer_name: String,

    /// Shipping address snapshot. None for POS sales.
    pub address: Option<Address>,

    /// Sum of line totals.
    pub subtotal: Money,

    /// Discount applied against the subtotal.
    pub discount: Money,

    /// Tax on the discounted subtotal.
    pub tax: Money,

    /// Shipping charge after the free-shipping threshold.
    pub shipping: Money,

    /// Cash-on-delivery surcharge, zero for prepaid.
    pub cod_surcharge: Money,

    /// Grand total.
    pub total: Money,

    /// How the order is paid.
    pub payment_method: PaymentMethod,

    /// Where the order was placed.
    pub source: OrderSource,

    /// Fulfillment status.
    pub status: OrderStatus,

    /// Payment status, an orthogonal axis.
    pub payment_status: PaymentStatus,

    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Assembles a new pending order from computed totals.
    pub fn new(
        customer_id: Option<CustomerId>,
        customer_name: impl Into<String>,
        address: Option<Address>,
        totals: CheckoutTotals,
        payment_method: PaymentMethod,
        source: OrderSource,
    ) -> Self {
        Self {
            id: OrderId::new(),
            customer_id,
            customer_name: customer_name.into(),
            address,
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax: totals.tax,
            shipping: totals.shipping,
            cod_surcharge: totals.cod_surcharge,
            total: totals.total,
            payment_method,
            source,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Validates a fulfillment status change, returning the rejected pair
    /// as an [`DomainError::InvalidTransition`] on failure.
    pub fn validate_transition(&self, next: OrderStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "order",
                from: self.status.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// Validates a payment status change.
    pub fn validate_payment_transition(&self, next: PaymentStatus) -> Result<(), DomainError> {
        if self.payment_status.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "payment",
                from: self.payment_status.as_str(),
                to: next.as_str(),
            })
        }
    }
}

/// A permanent price/quantity snapshot line under an order.
///
/// Never recomputed from the live product: later product edits must not
/// alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Owning order.
    pub order_id: OrderId,

    /// The product sold (SKU snapshot).
    pub product_id: ProductId,

    /// Product name at time of sale.
    pub product_name: String,

    /// Variant or size, if any.
    pub variant: Option<String>,

    /// Units sold.
    pub quantity: u32,

    /// Price per unit at time of sale.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order line.
    pub fn new(
        order_id: OrderId,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        variant: Option<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            order_id,
            product_id: product_id.into(),
            product_name: product_name.into(),
            variant,
            quantity,
            unit_price,
        }
    }

    /// Returns the line total (quantity × unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
