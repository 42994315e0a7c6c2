//! Loyalty and wallet operations.

use common::{CustomerId, Money, Principal};
use domain::{
    CustomerBalances, DomainError, LoyaltyKind, LoyaltyTransaction, WalletKind, WalletTransaction,
};
use store::{LedgerStore, StoreError};

use crate::error::{CommerceError, Result};

/// Customer-facing loyalty and wallet operations over the ledgers.
///
/// Customers act only on their own account; grants and top-ups are staff
/// operations naming the customer explicitly.
#[derive(Clone)]
pub struct LedgerService<S> {
    store: S,
}

impl<S> LedgerService<S>
where
    S: LedgerStore,
{
    /// Creates a ledger service over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Staff grant of loyalty points (promotion, goodwill).
    #[tracing::instrument(skip(self))]
    pub async fn earn_points(
        &self,
        principal: Principal,
        customer: CustomerId,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }
        if points <= 0 {
            return Err(DomainError::InvalidQuantity(points).into());
        }
        Ok(self
            .store
            .post_loyalty(customer, LoyaltyKind::Earn, points, reference)
            .await?)
    }

    /// Redeems points from the caller's own balance.
    #[tracing::instrument(skip(self))]
    pub async fn redeem_points(
        &self,
        principal: Principal,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        // The store's overdraw guard only checks `balance < points`; a
        // negative magnitude would slip past it and credit the account.
        if points <= 0 {
            return Err(DomainError::InvalidQuantity(points).into());
        }
        Ok(self
            .store
            .post_loyalty(customer, LoyaltyKind::Redeem, points, reference)
            .await?)
    }

    /// Staff wallet top-up (store credit, refund made in credit).
    #[tracing::instrument(skip(self))]
    pub async fn top_up_wallet(
        &self,
        principal: Principal,
        customer: CustomerId,
        amount: Money,
        reference: &str,
    ) -> Result<WalletTransaction> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }
        if !amount.is_positive() {
            return Err(DomainError::InvalidQuantity(amount.paise()).into());
        }
        Ok(self
            .store
            .post_wallet(customer, WalletKind::Credit, amount, reference)
            .await?)
    }

    /// Spends from the caller's own wallet.
    #[tracing::instrument(skip(self))]
    pub async fn debit_wallet(
        &self,
        principal: Principal,
        amount: Money,
        reference: &str,
    ) -> Result<WalletTransaction> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        if !amount.is_positive() {
            return Err(DomainError::InvalidQuantity(amount.paise()).into());
        }
        self.store
            .post_wallet(customer, WalletKind::Debit, amount, reference)
            .await
            .map_err(|err| match err {
                StoreError::InsufficientBalance {
                    requested,
                    available,
                } => CommerceError::WalletBalanceTooLow {
                    requested: Money::from_paise(requested),
                    available: Money::from_paise(available),
                },
                other => other.into(),
            })
    }

    /// Returns the caller's current balances.
    pub async fn balances(&self, principal: Principal) -> Result<CustomerBalances> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        Ok(self.store.balances(customer).await?)
    }

    /// Returns the caller's loyalty ledger, oldest first.
    pub async fn loyalty_history(&self, principal: Principal) -> Result<Vec<LoyaltyTransaction>> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        Ok(self.store.loyalty_history(customer).await?)
    }

    /// Returns the caller's wallet ledger, oldest first.
    pub async fn wallet_history(&self, principal: Principal) -> Result<Vec<WalletTransaction>> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        Ok(self.store.wallet_history(customer).await?)
    }

    /// System-driven award on order delivery. Not principal-gated: the
    /// order state machine is the caller and has already enforced staff
    /// access on the transition.
    pub(crate) async fn award_delivery_points(
        &self,
        customer: CustomerId,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction> {
        Ok(self
            .store
            .post_loyalty(customer, LoyaltyKind::Earn, points, reference)
            .await?)
    }
}
