//! Loyalty and wallet ledger transaction types.
//!
//! Both ledgers are append-only. Each row carries `balance_before` and
//! `balance_after` for auditability; the running sum of signed amounts must
//! reconcile with the customer's denormalized current balance.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a loyalty points posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyKind {
    /// Points awarded (order delivered, promotion).
    Earn,

    /// Points spent against a purchase.
    Redeem,
}

impl LoyaltyKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyKind::Earn => "earn",
            LoyaltyKind::Redeem => "redeem",
        }
    }

    /// Parses a kind from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "earn" => Some(LoyaltyKind::Earn),
            "redeem" => Some(LoyaltyKind::Redeem),
            _ => None,
        }
    }
}

/// One append-only row in a customer's loyalty ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    /// Transaction identifier.
    pub id: Uuid,

    /// Owning customer.
    pub customer_id: CustomerId,

    /// Earn or redeem.
    pub kind: LoyaltyKind,

    /// Unsigned point magnitude; sign comes from `kind`.
    pub points: i64,

    /// Balance before this posting.
    pub balance_before: i64,

    /// Balance after this posting.
    pub balance_after: i64,

    /// What caused it: an order ID or a staff note.
    pub reference: String,

    /// Posting time.
    pub created_at: DateTime<Utc>,
}

impl LoyaltyTransaction {
    /// Returns the points signed by kind (positive for earns).
    pub fn signed_points(&self) -> i64 {
        match self.kind {
            LoyaltyKind::Earn => self.points,
            LoyaltyKind::Redeem => -self.points,
        }
    }
}

/// Direction of a wallet posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Money added (top-up, refund).
    Credit,

    /// Money spent against a purchase.
    Debit,
}

impl WalletKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::Credit => "credit",
            WalletKind::Debit => "debit",
        }
    }

    /// Parses a kind from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit" => Some(WalletKind::Credit),
            "debit" => Some(WalletKind::Debit),
            _ => None,
        }
    }
}

/// One append-only row in a customer's wallet ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Transaction identifier.
    pub id: Uuid,

    /// Owning customer.
    pub customer_id: CustomerId,

    /// Credit or debit.
    pub kind: WalletKind,

    /// Unsigned amount; sign comes from `kind`.
    pub amount: Money,

    /// Balance before this posting.
    pub balance_before: Money,

    /// Balance after this posting.
    pub balance_after: Money,

    /// What caused it: an order ID or a staff note.
    pub reference: String,

    /// Posting time.
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Returns the amount signed by kind (positive for credits).
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            WalletKind::Credit => self.amount,
            WalletKind::Debit => Money::zero() - self.amount,
        }
    }
}

/// The denormalized current balances held on the customer record.
///
/// The fast path reads these directly; the ledgers are the reconciliation
/// source of truth and must independently sum to the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerBalances {
    /// Current loyalty point balance.
    pub loyalty_points: i64,

    /// Current wallet balance.
    pub wallet_balance: Money,
}
