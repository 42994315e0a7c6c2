//! Commerce configuration loaded from environment variables.

use common::Money;
use domain::PricingRules;

/// Pricing and loyalty knobs with sensible defaults.
///
/// Reads from environment variables (amounts in whole rupees):
/// - `TAX_RATE_BPS`: tax rate in basis points (default: `500`, i.e. 5%)
/// - `FREE_SHIPPING_THRESHOLD`: subtotal at which shipping is free
///   (default: `1000`)
/// - `SHIPPING_FLAT`: flat shipping charge below the threshold
///   (default: `80`)
/// - `COD_SURCHARGE`: cash-on-delivery surcharge (default: `50`)
/// - `LOYALTY_POINTS_BASIS`: rupees of order total per loyalty point
///   (default: `100`)
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    pub pricing: PricingRules,
    /// Paise of order total that earn one loyalty point.
    pub loyalty_points_basis: i64,
}

impl CommerceConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let rupees = |name: &str| {
            var(name)
                .and_then(|v| v.parse().ok())
                .map(Money::from_rupees)
        };

        Self {
            pricing: PricingRules {
                tax_rate_bps: var("TAX_RATE_BPS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.pricing.tax_rate_bps),
                free_shipping_threshold: rupees("FREE_SHIPPING_THRESHOLD")
                    .unwrap_or(defaults.pricing.free_shipping_threshold),
                shipping_flat: rupees("SHIPPING_FLAT").unwrap_or(defaults.pricing.shipping_flat),
                cod_surcharge: rupees("COD_SURCHARGE").unwrap_or(defaults.pricing.cod_surcharge),
            },
            // `points_for` divides by the basis; a non-positive value is
            // rejected here so the divisor is always > 0.
            loyalty_points_basis: rupees("LOYALTY_POINTS_BASIS")
                .filter(|m| m.is_positive())
                .map(|m| m.paise())
                .unwrap_or(defaults.loyalty_points_basis),
        }
    }

    /// Points earned for an order total: one point per full basis amount.
    pub fn points_for(&self, total: Money) -> i64 {
        total.paise() / self.loyalty_points_basis
    }
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            pricing: PricingRules::default(),
            loyalty_points_basis: Money::from_rupees(100).paise(),
        }
    }
}
