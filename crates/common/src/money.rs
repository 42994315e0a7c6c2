//! Money represented in integer paise to avoid floating point issues.

use serde::{Deserialize, Serialize};

/// A rupee amount stored as whole paise (e.g., 50000 = ₹500.00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in paise.
    paise: i64,
}

impl Money {
    /// Creates a new Money amount from paise.
    pub fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Creates a new Money amount from a whole-rupee value.
    pub fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { paise: 0 }
    }

    /// Returns the amount in paise.
    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Returns the rupee portion (whole number).
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// Returns the paise portion (remainder after whole rupees).
    pub fn paise_part(&self) -> i64 {
        self.paise.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.paise > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.paise < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise * quantity as i64,
        }
    }

    /// Applies a rate expressed in basis points, truncating toward zero.
    ///
    /// A 5% tax is 500 basis points: `Money::from_rupees(2500).apply_bps(500)`
    /// is ₹125.00.
    pub fn apply_bps(&self, basis_points: u32) -> Money {
        Money {
            paise: self.paise * basis_points as i64 / 10_000,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paise < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise + rhs.paise,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise - rhs.paise,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise += rhs.paise;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.paise -= rhs.paise;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
