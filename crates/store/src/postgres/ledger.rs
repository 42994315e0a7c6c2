use async_trait::async_trait;
use chrono::Utc;
use common::{CustomerId, Money};
use domain::{
    CustomerBalances, LoyaltyKind, LoyaltyTransaction, WalletKind, WalletTransaction,
};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{LedgerStore, Result, StoreError};

use super::{PostgresStore, parse_stored};

fn row_to_loyalty(row: PgRow) -> Result<LoyaltyTransaction> {
    let kind: String = row.try_get("kind")?;

    Ok(LoyaltyTransaction {
        id: row.try_get::<Uuid, _>("id")?,
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        kind: parse_stored("loyalty kind", &kind, LoyaltyKind::parse)?,
        points: row.try_get("points")?,
        balance_before: row.try_get("balance_before")?,
        balance_after: row.try_get("balance_after")?,
        reference: row.try_get("reference")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_wallet(row: PgRow) -> Result<WalletTransaction> {
    let kind: String = row.try_get("kind")?;

    Ok(WalletTransaction {
        id: row.try_get::<Uuid, _>("id")?,
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        kind: parse_stored("wallet kind", &kind, WalletKind::parse)?,
        amount: Money::from_paise(row.try_get("amount")?),
        balance_before: Money::from_paise(row.try_get("balance_before")?),
        balance_after: Money::from_paise(row.try_get("balance_after")?),
        reference: row.try_get("reference")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Locks the customer row for the posting, creating it at zero balances on
/// first contact.
async fn lock_balances(
    tx: &mut Transaction<'_, Postgres>,
    customer: CustomerId,
) -> Result<(i64, i64)> {
    sqlx::query("INSERT INTO customers (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(customer.as_uuid())
        .execute(&mut **tx)
        .await?;

    let row = sqlx::query(
        "SELECT loyalty_points, wallet_balance FROM customers WHERE id = $1 FOR UPDATE",
    )
    .bind(customer.as_uuid())
    .fetch_one(&mut **tx)
    .await?;

    Ok((row.try_get("loyalty_points")?, row.try_get("wallet_balance")?))
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn post_loyalty(
        &self,
        customer: CustomerId,
        kind: LoyaltyKind,
        points: i64,
        reference: &str,
    ) -> Result<LoyaltyTransaction> {
        let mut tx = self.pool.begin().await?;
        let (before, _) = lock_balances(&mut tx, customer).await?;

        let after = match kind {
            LoyaltyKind::Earn => before + points,
            LoyaltyKind::Redeem => {
                if before < points {
                    return Err(StoreError::InsufficientBalance {
                        requested: points,
                        available: before,
                    });
                }
                before - points
            }
        };

        sqlx::query("UPDATE customers SET loyalty_points = $2 WHERE id = $1")
            .bind(customer.as_uuid())
            .bind(after)
            .execute(&mut *tx)
            .await?;

        let txn = LoyaltyTransaction {
            id: Uuid::new_v4(),
            customer_id: customer,
            kind,
            points,
            balance_before: before,
            balance_after: after,
            reference: reference.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO loyalty_transactions (id, customer_id, kind, points,
                                              balance_before, balance_after, reference, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(txn.id)
        .bind(txn.customer_id.as_uuid())
        .bind(txn.kind.as_str())
        .bind(txn.points)
        .bind(txn.balance_before)
        .bind(txn.balance_after)
        .bind(&txn.reference)
        .bind(txn.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(txn)
    }

    async fn post_wallet(
        &self,
        customer: CustomerId,
        kind: WalletKind,
        amount: Money,
        reference: &str,
    ) -> Result<WalletTransaction> {
        let mut tx = self.pool.begin().await?;
        let (_, before_paise) = lock_balances(&mut tx, customer).await?;
        let before = Money::from_paise(before_paise);

        let after = match kind {
            WalletKind::Credit => before + amount,
            WalletKind::Debit => {
                if before < amount {
                    return Err(StoreError::InsufficientBalance {
                        requested: amount.paise(),
                        available: before.paise(),
                    });
                }
                before - amount
            }
        };

        sqlx::query("UPDATE customers SET wallet_balance = $2 WHERE id = $1")
            .bind(customer.as_uuid())
            .bind(after.paise())
            .execute(&mut *tx)
            .await?;

        let txn = WalletTransaction {
            id: Uuid::new_v4(),
            customer_id: customer,
            kind,
            amount,
            balance_before: before,
            balance_after: after,
            reference: reference.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (id, customer_id, kind, amount,
                                             balance_before, balance_after, reference, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(txn.id)
        .bind(txn.customer_id.as_uuid())
        .bind(txn.kind.as_str())
        .bind(txn.amount.paise())
        .bind(txn.balance_before.paise())
        .bind(txn.balance_after.paise())
        .bind(&txn.reference)
        .bind(txn.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(txn)
    }

    async fn balances(&self, customer: CustomerId) -> Result<CustomerBalances> {
        let row = sqlx::query(
            "SELECT loyalty_points, wallet_balance FROM customers WHERE id = $1",
        )
        .bind(customer.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(CustomerBalances {
                loyalty_points: row.try_get("loyalty_points")?,
                wallet_balance: Money::from_paise(row.try_get("wallet_balance")?),
            }),
            // A customer the ledgers have never seen has zero balances.
            None => Ok(CustomerBalances::default()),
        }
    }

    async fn loyalty_history(&self, customer: CustomerId) -> Result<Vec<LoyaltyTransaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, kind, points, balance_before, balance_after, reference, created_at
            FROM loyalty_transactions
            WHERE customer_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_loyalty).collect()
    }

    async fn wallet_history(&self, customer: CustomerId) -> Result<Vec<WalletTransaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, kind, amount, balance_before, balance_after, reference, created_at
            FROM wallet_transactions
            WHERE customer_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_wallet).collect()
    }
}
