//! Loyalty and wallet ledger storage.

use async_trait::async_trait;
use common::{CustomerId, Money};
use domain::{
    CustomerBalances, LoyaltyKind, LoyaltyTransaction, WalletKind, WalletTransaction,
};

use crate::Result;

/// Append-only ledgers with denormalized current balances.
///
/// A posting writes the transaction row (carrying `balance_before` and
/// `balance_after`) and the customer's denormalized balance in one atomic
/// step: both succeed or neither does. Debits and redemptions are guarded
/// in that same step, failing with
/// [`crate::StoreError::InsufficientBalance`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Posts a loyalty earn or redeem, returning the appended row.
    async fn post_loyalty(
        &self,
        customer: CustomerId,
        kind: LoyaltyKind,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction>;

    /// Posts a wallet credit or debit, returning the appended row.
    async fn post_wallet(
        &self,
        customer: CustomerId,
        kind: WalletKind,
        amount: Money,
        reference: &str,
    ) -> Result<WalletTransaction>;

    /// Fast path: reads the denormalized balances off the customer record.
    async fn balances(&self, customer: CustomerId) -> Result<CustomerBalances>;

    /// Returns the loyalty ledger for a customer, oldest first.
    async fn loyalty_history(&self, customer: CustomerId) -> Result<Vec<LoyaltyTransaction>>;

    /// Returns the wallet ledger for a customer, oldest first.
    async fn wallet_history(&self, customer: CustomerId) -> Result<Vec<WalletTransaction>>;
}
