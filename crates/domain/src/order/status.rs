//! Order and payment state machines.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► Processing ──► Ready ──► Delivered
///    │            │             │           │
///    └────────────┴─────────────┴───────────┴──► Cancelled
/// ```
///
/// Forward transitions are staff-driven, one step at a time; there is no
/// automatic advancement. Terminal states admit no transition out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting staff confirmation.
    #[default]
    Pending,

    /// Confirmed by staff.
    Confirmed,

    /// Being packed.
    Processing,

    /// Packed and awaiting dispatch or pickup.
    Ready,

    /// Handed to the customer (terminal state).
    Delivered,

    /// Called off (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns the next status on the happy path, if any.
    pub fn next_forward(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Returns true if the requested transition is legal.
    ///
    /// Legal moves are the single forward step and cancellation from any
    /// non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_forward() == Some(next)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string form, rejecting anything outside
    /// the known set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "ready" => Some(OrderStatus::Ready),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of an order, orthogonal to fulfillment.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Paid ─────► Refunded
///           └──► Partial ──┬──► Paid
///                          └──► Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[default]
    Pending,

    /// Fully paid.
    Paid,

    /// Advance received, balance due.
    Partial,

    /// Money returned (terminal state).
    Refunded,
}

impl PaymentStatus {
    /// Returns true if the requested transition is legal.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Partial)
                | (PaymentStatus::Partial, PaymentStatus::Paid)
                | (PaymentStatus::Partial, PaymentStatus::Refunded)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Refunded)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Parses a status from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "partial" => Some(PaymentStatus::Partial),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
