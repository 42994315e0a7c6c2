use async_trait::async_trait;
use common::ProductId;
use domain::{InventoryRecord, MovementType, StockMovement};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{InventoryStore, Result, StoreError};

use super::{PostgresStore, parse_stored};

fn row_to_record(row: PgRow) -> Result<InventoryRecord> {
    Ok(InventoryRecord {
        product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
        quantity: row.try_get("quantity")?,
        reserved_quantity: row.try_get("reserved_quantity")?,
    })
}

fn row_to_movement(row: PgRow) -> Result<StockMovement> {
    let movement_type: String = row.try_get("movement_type")?;

    Ok(StockMovement {
        id: row.try_get::<Uuid, _>("id")?,
        product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
        delta: row.try_get("delta")?,
        movement_type: parse_stored("movement type", &movement_type, MovementType::parse)?,
        reference: row.try_get("reference")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn fetch_record(pool: &PgPool, id: &ProductId) -> Result<InventoryRecord> {
    let row = sqlx::query(
        "SELECT product_id, quantity, reserved_quantity FROM inventory WHERE product_id = $1",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => row_to_record(row),
        None => Err(StoreError::not_found("inventory", id)),
    }
}

async fn insert_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: &StockMovement,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, product_id, delta, movement_type, reference, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(movement.id)
    .bind(movement.product_id.as_str())
    .bind(movement.delta)
    .bind(movement.movement_type.as_str())
    .bind(&movement.reference)
    .bind(movement.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl InventoryStore for PostgresStore {
    async fn get_inventory(&self, id: &ProductId) -> Result<InventoryRecord> {
        fetch_record(&self.pool, id).await
    }

    async fn reserve(&self, id: &ProductId, qty: u32) -> Result<()> {
        let qty = qty as i64;

        // The guard rides inside the UPDATE itself; concurrent reservations
        // serialize on the row lock and the loser sees the winner's count.
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET reserved_quantity = reserved_quantity + $2
            WHERE product_id = $1 AND reserved_quantity + $2 <= quantity
            "#,
        )
        .bind(id.as_str())
        .bind(qty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing record from a failed guard.
            let record = fetch_record(&self.pool, id).await?;
            tracing::debug!(
                product = %id,
                requested = qty,
                available = record.available(),
                "reservation rejected"
            );
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: qty,
                available: record.available(),
            });
        }
        Ok(())
    }

    async fn commit(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()> {
        let qty = qty as i64;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity - $2, reserved_quantity = reserved_quantity - $2
            WHERE product_id = $1 AND reserved_quantity >= $2
            "#,
        )
        .bind(id.as_str())
        .bind(qty)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let record = fetch_record(&self.pool, id).await?;
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: qty,
                available: record.reserved_quantity,
            });
        }

        let movement = StockMovement::new(id.clone(), -qty, MovementType::Sale, reference);
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn release(&self, id: &ProductId, qty: u32) -> Result<()> {
        // Clamped at zero so duplicated rollbacks are no-ops.
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET reserved_quantity = reserved_quantity - LEAST(reserved_quantity, $2)
            WHERE product_id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(qty as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("inventory", id));
        }
        Ok(())
    }

    async fn restock(&self, id: &ProductId, qty: u32, reference: &str) -> Result<()> {
        let qty = qty as i64;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE inventory SET quantity = quantity + $2 WHERE product_id = $1",
        )
        .bind(id.as_str())
        .bind(qty)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("inventory", id));
        }

        let movement = StockMovement::new(id.clone(), qty, MovementType::Restock, reference);
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn adjust(&self, id: &ProductId, delta: i64, reference: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // The adjusted quantity must stay at or above the reserved count.
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity + $2
            WHERE product_id = $1
              AND quantity + $2 >= reserved_quantity
              AND quantity + $2 >= 0
            "#,
        )
        .bind(id.as_str())
        .bind(delta)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let record = fetch_record(&self.pool, id).await?;
            return Err(StoreError::InsufficientStock {
                product: id.clone(),
                requested: -delta,
                available: record.available(),
            });
        }

        let movement = StockMovement::new(id.clone(), delta, MovementType::Adjustment, reference);
        insert_movement(&mut tx, &movement).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn movements_for(&self, id: &ProductId) -> Result<Vec<StockMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, delta, movement_type, reference, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_movement).collect()
    }
}
