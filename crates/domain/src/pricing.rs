//! Checkout totals computation.

use common::Money;
use serde::{Deserialize, Serialize};

/// Pricing inputs configured by the shop, not hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Tax rate in basis points (500 = 5%).
    pub tax_rate_bps: u32,

    /// Order subtotals at or above this ship free.
    pub free_shipping_threshold: Money,

    /// Flat shipping charge below the threshold.
    pub shipping_flat: Money,

    /// Surcharge added to cash-on-delivery orders.
    pub cod_surcharge: Money,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            tax_rate_bps: 500,
            free_shipping_threshold: Money::from_rupees(1000),
            shipping_flat: Money::from_rupees(80),
            cod_surcharge: Money::from_rupees(50),
        }
    }
}

/// The computed money breakdown of a checkout.
///
/// `subtotal = Σ(unit_price × qty)`, `taxable = subtotal − discount`
/// (floored at zero), tax applies to the taxable amount, and
/// `total = taxable + tax + shipping + cod_surcharge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping: Money,
    pub cod_surcharge: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// Computes the breakdown for a given subtotal and discount.
    pub fn compute(
        subtotal: Money,
        discount: Money,
        cash_on_delivery: bool,
        rules: &PricingRules,
    ) -> Self {
        let taxable = if discount >= subtotal {
            Money::zero()
        } else {
            subtotal - discount
        };
        let tax = taxable.apply_bps(rules.tax_rate_bps);
        let shipping = if subtotal >= rules.free_shipping_threshold {
            Money::zero()
        } else {
            rules.shipping_flat
        };
        let cod_surcharge = if cash_on_delivery {
            rules.cod_surcharge
        } else {
            Money::zero()
        };

        Self {
            subtotal,
            discount,
            tax,
            shipping,
            cod_surcharge,
            total: taxable + tax + shipping + cod_surcharge,
        }
    }
}
