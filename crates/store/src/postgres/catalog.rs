use async_trait::async_trait;
use common::{Money, ProductId};
use domain::{Product, ProductStatus};
use sqlx::{Row, postgres::PgRow};

use crate::{ProductStore, Result, StoreError};

use super::{PostgresStore, parse_stored};

fn row_to_product(row: PgRow) -> Result<Product> {
    let status: String = row.try_get("status")?;

    Ok(Product {
        id: ProductId::new(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        price: Money::from_paise(row.try_get("price")?),
        cost: Money::from_paise(row.try_get("cost")?),
        category: row.try_get("category")?,
        fabric: row.try_get("fabric")?,
        technique: row.try_get("technique")?,
        status: parse_stored("product status", &status, ProductStatus::parse)?,
        low_stock_threshold: row.try_get("low_stock_threshold")?,
    })
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, product: &Product, initial_quantity: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, cost, category, fabric, technique, status, low_stock_threshold)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.paise())
        .bind(product.cost.paise())
        .bind(&product.category)
        .bind(&product.fabric)
        .bind(&product.technique)
        .bind(product.status.as_str())
        .bind(product.low_stock_threshold)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO inventory (product_id, quantity, reserved_quantity) VALUES ($1, $2, 0)",
        )
        .bind(product.id.as_str())
        .bind(initial_quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, cost, category, fabric, technique, status, low_stock_threshold
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_product(row),
            None => Err(StoreError::not_found("product", id)),
        }
    }

    async fn update_price(&self, id: &ProductId, price: Money) -> Result<()> {
        let result = sqlx::query("UPDATE products SET price = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(price.paise())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    async fn set_product_status(&self, id: &ProductId, status: ProductStatus) -> Result<()> {
        let result = sqlx::query("UPDATE products SET status = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }
}
