use async_trait::async_trait;
use common::{CustomerId, Money, OrderId, ProductId};
use domain::{
    Address, Order, OrderItem, OrderSource, OrderStatus, PaymentMethod, PaymentStatus,
};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{OrderStore, Result, StoreError};

use super::{PostgresStore, parse_quantity, parse_stored};

fn row_to_order(row: PgRow) -> Result<Order> {
    let address: Option<serde_json::Value> = row.try_get("address")?;
    let address: Option<Address> = address.map(serde_json::from_value).transpose()?;

    let payment_method: String = row.try_get("payment_method")?;
    let source: String = row.try_get("source")?;
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;

    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        customer_id: row
            .try_get::<Option<Uuid>, _>("customer_id")?
            .map(CustomerId::from_uuid),
        customer_name: row.try_get("customer_name")?,
        address,
        subtotal: Money::from_paise(row.try_get("subtotal")?),
        discount: Money::from_paise(row.try_get("discount")?),
        tax: Money::from_paise(row.try_get("tax")?),
        shipping: Money::from_paise(row.try_get("shipping")?),
        cod_surcharge: Money::from_paise(row.try_get("cod_surcharge")?),
        total: Money::from_paise(row.try_get("total")?),
        payment_method: parse_stored("payment method", &payment_method, PaymentMethod::parse)?,
        source: parse_stored("order source", &source, OrderSource::parse)?,
        status: parse_stored("order status", &status, OrderStatus::parse)?,
        payment_status: parse_stored("payment status", &payment_status, PaymentStatus::parse)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
    let quantity: i64 = row.try_get("quantity")?;

    Ok(OrderItem {
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
        product_name: row.try_get("product_name")?,
        variant: row.try_get("variant")?,
        quantity: parse_quantity("order quantity", quantity)?,
        unit_price: Money::from_paise(row.try_get("unit_price")?),
    })
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let address_json = order.address.as_ref().map(serde_json::to_value).transpose()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, customer_name, address,
                                subtotal, discount, tax, shipping, cod_surcharge, total,
                                payment_method, source, status, payment_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.map(|c| c.as_uuid()))
        .bind(&order.customer_name)
        .bind(address_json)
        .bind(order.subtotal.paise())
        .bind(order.discount.paise())
        .bind(order.tax.paise())
        .bind(order.shipping.paise())
        .bind(order.cod_surcharge.paise())
        .bind(order.total.paise())
        .bind(order.payment_method.as_str())
        .bind(order.source.as_str())
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, variant, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_str())
            .bind(&item.product_name)
            .bind(&item.variant)
            .bind(item.quantity as i64)
            .bind(item.unit_price.paise())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, customer_name, address,
                   subtotal, discount, tax, shipping, cod_surcharge, total,
                   payment_method, source, status, payment_status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_order(row),
            None => Err(StoreError::not_found("order", id)),
        }
    }

    async fn order_items(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, product_name, variant, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order_item).collect()
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }

    async fn update_payment_status(&self, id: OrderId, status: PaymentStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET payment_status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }

    async fn orders_for_customer(&self, customer: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, customer_name, address,
                   subtotal, discount, tax, shipping, cod_surcharge, total,
                   payment_method, source, status, payment_status, created_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }
}
