use async_trait::async_trait;
use common::{CustomOrderId, CustomerId, Money};
use domain::{
    CustomOrder, CustomOrderImage, CustomOrderMessage, CustomOrderStatus, StatusHistoryEntry,
};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{CustomOrderStore, Result, StoreError};

use super::{PostgresStore, parse_stored};

fn row_to_custom_order(row: PgRow) -> Result<CustomOrder> {
    let status: String = row.try_get("status")?;

    Ok(CustomOrder {
        id: CustomOrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
        title: row.try_get("title")?,
        requirements: row.try_get("requirements")?,
        budget_min: Money::from_paise(row.try_get("budget_min")?),
        budget_max: Money::from_paise(row.try_get("budget_max")?),
        timeline: row.try_get("timeline")?,
        status: parse_stored("custom order status", &status, CustomOrderStatus::parse)?,
        estimated_price: row
            .try_get::<Option<i64>, _>("estimated_price")?
            .map(Money::from_paise),
        final_price: row
            .try_get::<Option<i64>, _>("final_price")?
            .map(Money::from_paise),
        created_at: row.try_get("created_at")?,
        discussion_started_at: row.try_get("discussion_started_at")?,
        quote_sent_at: row.try_get("quote_sent_at")?,
        quote_accepted_at: row.try_get("quote_accepted_at")?,
        production_started_at: row.try_get("production_started_at")?,
        ready_at: row.try_get("ready_at")?,
        delivered_at: row.try_get("delivered_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
    })
}

fn row_to_history(row: PgRow) -> Result<StatusHistoryEntry> {
    let status: String = row.try_get("status")?;

    Ok(StatusHistoryEntry {
        id: row.try_get::<Uuid, _>("id")?,
        custom_order_id: CustomOrderId::from_uuid(row.try_get::<Uuid, _>("custom_order_id")?),
        status: parse_stored("custom order status", &status, CustomOrderStatus::parse)?,
        notes: row.try_get("notes")?,
        changed_by: row.try_get("changed_by")?,
        changed_at: row.try_get("changed_at")?,
    })
}

fn row_to_message(row: PgRow) -> Result<CustomOrderMessage> {
    Ok(CustomOrderMessage {
        id: row.try_get::<Uuid, _>("id")?,
        custom_order_id: CustomOrderId::from_uuid(row.try_get::<Uuid, _>("custom_order_id")?),
        sender: row.try_get("sender")?,
        body: row.try_get("body")?,
        sent_at: row.try_get("sent_at")?,
    })
}

fn row_to_image(row: PgRow) -> Result<CustomOrderImage> {
    Ok(CustomOrderImage {
        id: row.try_get::<Uuid, _>("id")?,
        custom_order_id: CustomOrderId::from_uuid(row.try_get::<Uuid, _>("custom_order_id")?),
        url: row.try_get("url")?,
        caption: row.try_get("caption")?,
        uploaded_at: row.try_get("uploaded_at")?,
    })
}

async fn insert_history(
    tx: &mut Transaction<'_, Postgres>,
    history: &StatusHistoryEntry,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO custom_order_status_history (id, custom_order_id, status, notes, changed_by, changed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(history.id)
    .bind(history.custom_order_id.as_uuid())
    .bind(history.status.as_str())
    .bind(&history.notes)
    .bind(&history.changed_by)
    .bind(history.changed_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl CustomOrderStore for PostgresStore {
    async fn insert_custom_order(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO custom_orders (id, customer_id, title, requirements,
                                       budget_min, budget_max, timeline, status,
                                       estimated_price, final_price, created_at,
                                       discussion_started_at, quote_sent_at, quote_accepted_at,
                                       production_started_at, ready_at, delivered_at, cancelled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.customer_id.as_uuid())
        .bind(&request.title)
        .bind(&request.requirements)
        .bind(request.budget_min.paise())
        .bind(request.budget_max.paise())
        .bind(&request.timeline)
        .bind(request.status.as_str())
        .bind(request.estimated_price.map(|p| p.paise()))
        .bind(request.final_price.map(|p| p.paise()))
        .bind(request.created_at)
        .bind(request.discussion_started_at)
        .bind(request.quote_sent_at)
        .bind(request.quote_accepted_at)
        .bind(request.production_started_at)
        .bind(request.ready_at)
        .bind(request.delivered_at)
        .bind(request.cancelled_at)
        .execute(&mut *tx)
        .await?;

        insert_history(&mut tx, history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_custom_order(&self, id: CustomOrderId) -> Result<CustomOrder> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, title, requirements, budget_min, budget_max, timeline,
                   status, estimated_price, final_price, created_at,
                   discussion_started_at, quote_sent_at, quote_accepted_at,
                   production_started_at, ready_at, delivered_at, cancelled_at
            FROM custom_orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_custom_order(row),
            None => Err(StoreError::not_found("custom order", id)),
        }
    }

    async fn update_status(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE custom_orders
            SET status = $2,
                discussion_started_at = $3, quote_sent_at = $4, quote_accepted_at = $5,
                production_started_at = $6, ready_at = $7, delivered_at = $8, cancelled_at = $9
            WHERE id = $1
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.discussion_started_at)
        .bind(request.quote_sent_at)
        .bind(request.quote_accepted_at)
        .bind(request.production_started_at)
        .bind(request.ready_at)
        .bind(request.delivered_at)
        .bind(request.cancelled_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("custom order", request.id));
        }

        insert_history(&mut tx, history).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_prices(&self, request: &CustomOrder) -> Result<()> {
        let result = sqlx::query(
            "UPDATE custom_orders SET estimated_price = $2, final_price = $3 WHERE id = $1",
        )
        .bind(request.id.as_uuid())
        .bind(request.estimated_price.map(|p| p.paise()))
        .bind(request.final_price.map(|p| p.paise()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("custom order", request.id));
        }
        Ok(())
    }

    async fn append_message(&self, message: &CustomOrderMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO custom_order_messages (id, custom_order_id, sender, body, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.custom_order_id.as_uuid())
        .bind(&message.sender)
        .bind(&message.body)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_image(&self, image: &CustomOrderImage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO custom_order_images (id, custom_order_id, url, caption, uploaded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(image.id)
        .bind(image.custom_order_id.as_uuid())
        .bind(&image.url)
        .bind(&image.caption)
        .bind(image.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn status_history(&self, id: CustomOrderId) -> Result<Vec<StatusHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, custom_order_id, status, notes, changed_by, changed_at
            FROM custom_order_status_history
            WHERE custom_order_id = $1
            ORDER BY changed_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_history).collect()
    }

    async fn messages(&self, id: CustomOrderId) -> Result<Vec<CustomOrderMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, custom_order_id, sender, body, sent_at
            FROM custom_order_messages
            WHERE custom_order_id = $1
            ORDER BY sent_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn images(&self, id: CustomOrderId) -> Result<Vec<CustomOrderImage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, custom_order_id, url, caption, uploaded_at
            FROM custom_order_images
            WHERE custom_order_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_image).collect()
    }

    async fn custom_orders_for_customer(&self, customer: CustomerId) -> Result<Vec<CustomOrder>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, title, requirements, budget_min, budget_max, timeline,
                   status, estimated_price, final_price, created_at,
                   discussion_started_at, quote_sent_at, quote_accepted_at,
                   production_started_at, ready_at, delivered_at, cancelled_at
            FROM custom_orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_custom_order).collect()
    }
}
