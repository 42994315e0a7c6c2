//! Inventory records and the stock movement log.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-product stock counts.
///
/// Invariant: `0 <= reserved_quantity <= quantity`. The only number safe to
/// sell against is [`InventoryRecord::available`]. Records are created with
/// their product and updated only through reservation, fulfillment and
/// restock events, never directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// The product this record tracks.
    pub product_id: ProductId,

    /// On-hand quantity.
    pub quantity: i64,

    /// Quantity committed to in-flight checkouts but not yet fulfilled.
    pub reserved_quantity: i64,
}

impl InventoryRecord {
    /// Creates a record with the given on-hand quantity and no reservations.
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            reserved_quantity: 0,
        }
    }

    /// On-hand minus reserved.
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }

    /// Returns true if `requested` units could be sold right now.
    pub fn can_fulfill(&self, requested: i64) -> bool {
        requested <= self.available()
    }

    /// Returns true if the reservation bounds invariant holds.
    pub fn is_consistent(&self) -> bool {
        0 <= self.reserved_quantity && self.reserved_quantity <= self.quantity
    }

    /// Returns true if available stock is at or below the given threshold.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.available() <= threshold
    }
}

/// The kind of discrete change recorded in the movement log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Fulfillment decrement paired with releasing the matching reservation.
    Sale,

    /// Goods returned to saleable stock (new stock or a cancelled order).
    Restock,

    /// Manual staff correction.
    Adjustment,
}

impl MovementType {
    /// Returns the movement type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::Restock => "restock",
            MovementType::Adjustment => "adjustment",
        }
    }

    /// Parses a movement type from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(MovementType::Sale),
            "restock" => Some(MovementType::Restock),
            "adjustment" => Some(MovementType::Adjustment),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only row in the stock movement log.
///
/// Every change to an inventory record's `quantity` has a corresponding
/// movement, written atomically with it. The deltas for a product sum to
/// `quantity - initial_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement identifier.
    pub id: Uuid,

    /// The product whose on-hand quantity changed.
    pub product_id: ProductId,

    /// Signed quantity change (negative for sales).
    pub delta: i64,

    /// What kind of change this was.
    pub movement_type: MovementType,

    /// What caused it: an order ID, "initial stock", a staff note.
    pub reference: String,

    /// When the change happened.
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Creates a movement row stamped with the current time.
    pub fn new(
        product_id: impl Into<ProductId>,
        delta: i64,
        movement_type: MovementType,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            delta,
            movement_type,
            reference: reference.into(),
            created_at: Utc::now(),
        }
    }
}
