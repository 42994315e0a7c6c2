use async_trait::async_trait;
use common::{CartItemId, CustomerId, ProductId};
use domain::CartItem;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{CartStore, Result, StoreError};

use super::{PostgresStore, parse_quantity};

fn row_to_cart_item(row: PgRow) -> Result<CartItem> {
    let quantity: i64 = row.try_get("quantity")?;

    Ok(CartItem {
        id: CartItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
        variant: row.try_get("variant")?,
        quantity: parse_quantity("cart quantity", quantity)?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn cart_items(&self, customer: CustomerId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, product_id, variant, quantity, updated_at
            FROM cart_items
            WHERE customer_id = $1
            ORDER BY updated_at ASC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_cart_item).collect()
    }

    async fn get_cart_item(&self, id: CartItemId) -> Result<CartItem> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, product_id, variant, quantity, updated_at
            FROM cart_items
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_cart_item(row),
            None => Err(StoreError::not_found("cart item", id)),
        }
    }

    async fn upsert_cart_item(&self, item: &CartItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, customer_id, product_id, variant, quantity, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.customer_id.as_uuid())
        .bind(item.product_id.as_str())
        .bind(&item.variant)
        .bind(item.quantity as i64)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_cart_item(&self, id: CartItemId) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, customer: CustomerId) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE customer_id = $1")
            .bind(customer.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
