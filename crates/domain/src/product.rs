//! Product catalog types.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Listed and sellable.
    #[default]
    Active,

    /// Hidden from the shop but kept on record.
    Inactive,

    /// Retired permanently.
    Archived,
}

impl ProductStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Archived => "archived",
        }
    }

    /// Parses a status from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog product.
///
/// Identity is immutable; price and status are staff-mutable. Stock is not
/// held here; see [`crate::inventory::InventoryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier (SKU).
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Current selling price. Live; order items snapshot it at checkout.
    pub price: Money,

    /// Cost of goods, for margin reporting.
    pub cost: Money,

    /// Category tag (e.g. "saree", "stole").
    pub category: Option<String>,

    /// Fabric tag (e.g. "cotton", "tussar").
    pub fabric: Option<String>,

    /// Technique tag (e.g. "block print", "kantha").
    pub technique: Option<String>,

    /// Lifecycle status.
    pub status: ProductStatus,

    /// Alert threshold for the low-stock report.
    pub low_stock_threshold: i64,
}

impl Product {
    /// Creates an active product with the given identity, name and price.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            cost: Money::zero(),
            category: None,
            fabric: None,
            technique: None,
            status: ProductStatus::Active,
            low_stock_threshold: 0,
        }
    }

    /// Returns true if the product can currently be sold.
    pub fn is_sellable(&self) -> bool {
        self.status == ProductStatus::Active
    }
}
