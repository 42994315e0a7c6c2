//! Custom-order storage.

use async_trait::async_trait;
use common::{CustomOrderId, CustomerId};
use domain::{CustomOrder, CustomOrderImage, CustomOrderMessage, StatusHistoryEntry};

use crate::Result;

/// Storage for made-to-order requests and their child collections.
///
/// Status writes always carry their history row in the same transaction;
/// the history is the audit trail and must never miss a transition.
#[async_trait]
pub trait CustomOrderStore: Send + Sync {
    /// Inserts a new request with its initial `submitted` history row,
    /// atomically.
    async fn insert_custom_order(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()>;

    /// Fetches a request.
    async fn get_custom_order(&self, id: CustomOrderId) -> Result<CustomOrder>;

    /// Writes a validated status change (status plus the set-once milestone
    /// timestamps) and appends its history row, atomically.
    async fn update_status(
        &self,
        request: &CustomOrder,
        history: &StatusHistoryEntry,
    ) -> Result<()>;

    /// Writes the validated estimated/final price fields.
    async fn update_prices(&self, request: &CustomOrder) -> Result<()>;

    /// Appends a message to the request's thread.
    async fn append_message(&self, message: &CustomOrderMessage) -> Result<()>;

    /// Attaches a reference image.
    async fn append_image(&self, image: &CustomOrderImage) -> Result<()>;

    /// Returns the status history, oldest first.
    async fn status_history(&self, id: CustomOrderId) -> Result<Vec<StatusHistoryEntry>>;

    /// Returns the message thread, oldest first.
    async fn messages(&self, id: CustomOrderId) -> Result<Vec<CustomOrderMessage>>;

    /// Returns the attached images, oldest first.
    async fn images(&self, id: CustomOrderId) -> Result<Vec<CustomOrderImage>>;

    /// Returns a customer's requests, newest first.
    async fn custom_orders_for_customer(&self, customer: CustomerId) -> Result<Vec<CustomOrder>>;
}
