//! Custom-order (made-to-order) operations.

use chrono::Utc;
use common::{CustomOrderId, CustomerId, Money, Principal};
use domain::{
    CustomOrder, CustomOrderImage, CustomOrderMessage, CustomOrderStatus, StatusHistoryEntry,
};
use store::{CustomOrderStore, StoreError};

use crate::error::{CommerceError, Result};

/// Made-to-order request lifecycle operations.
///
/// Requests run from submission to delivery over weeks. Every status
/// change lands in the history audit trail atomically with the status
/// itself; the denormalized milestone timestamps are conveniences set on
/// first entry only.
#[derive(Clone)]
pub struct CustomOrderService<S> {
    store: S,
}

impl<S> CustomOrderService<S>
where
    S: CustomOrderStore,
{
    /// Creates a custom-order service over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Submits a new request for the calling customer.
    #[tracing::instrument(skip(self, requirements))]
    pub async fn submit(
        &self,
        principal: Principal,
        title: &str,
        requirements: &str,
        budget_min: Money,
        budget_max: Money,
        timeline: &str,
    ) -> Result<CustomOrder> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;

        let request = CustomOrder::new(
            customer,
            title,
            requirements,
            budget_min,
            budget_max,
            timeline,
        );
        let history =
            StatusHistoryEntry::new(request.id, request.status, None, principal.label());
        self.store.insert_custom_order(&request, &history).await?;
        Ok(request)
    }

    /// Moves a request to `next` along the happy path, or anywhere short
    /// of resurrecting `delivered` when `override_chain` is set (explicit
    /// staff correction). Either way the change lands in the history.
    #[tracing::instrument(skip(self, notes))]
    pub async fn transition(
        &self,
        principal: Principal,
        id: CustomOrderId,
        next: CustomOrderStatus,
        notes: Option<String>,
        override_chain: bool,
    ) -> Result<CustomOrder> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }

        let mut request = self.store.get_custom_order(id).await?;
        request.validate_transition(next, override_chain)?;
        request.apply_status(next, Utc::now());

        let history = StatusHistoryEntry::new(id, next, notes, principal.label());
        self.store.update_status(&request, &history).await?;

        tracing::info!(request = %id, to = next.as_str(), override_chain, "custom order transition");
        Ok(request)
    }

    /// Customer cancellation of their own request; staff may cancel any.
    pub async fn cancel(
        &self,
        principal: Principal,
        id: CustomOrderId,
        notes: Option<String>,
    ) -> Result<CustomOrder> {
        let mut request = self.owned_or_staff(principal, id).await?;
        request.validate_transition(CustomOrderStatus::Cancelled, false)?;
        request.apply_status(CustomOrderStatus::Cancelled, Utc::now());

        let history =
            StatusHistoryEntry::new(id, CustomOrderStatus::Cancelled, notes, principal.label());
        self.store.update_status(&request, &history).await?;
        Ok(request)
    }

    /// Records the price estimate being prepared for the quote.
    pub async fn set_estimated_price(
        &self,
        principal: Principal,
        id: CustomOrderId,
        price: Money,
    ) -> Result<CustomOrder> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }
        let mut request = self.store.get_custom_order(id).await?;
        request.set_estimated_price(price)?;
        self.store.update_prices(&request).await?;
        Ok(request)
    }

    /// Records the agreed price. Legal only at `quote_accepted` or later,
    /// immutable once set.
    pub async fn set_final_price(
        &self,
        principal: Principal,
        id: CustomOrderId,
        price: Money,
    ) -> Result<CustomOrder> {
        if !principal.is_staff() {
            return Err(CommerceError::StaffRequired);
        }
        let mut request = self.store.get_custom_order(id).await?;
        request.set_final_price(price)?;
        self.store.update_prices(&request).await?;
        Ok(request)
    }

    /// Appends a message to the request's thread. Customers may only write
    /// to their own requests.
    pub async fn add_message(
        &self,
        principal: Principal,
        id: CustomOrderId,
        body: &str,
    ) -> Result<CustomOrderMessage> {
        self.owned_or_staff(principal, id).await?;
        let message = CustomOrderMessage::new(id, principal.label(), body);
        self.store.append_message(&message).await?;
        Ok(message)
    }

    /// Attaches a reference image to the request.
    pub async fn add_image(
        &self,
        principal: Principal,
        id: CustomOrderId,
        url: &str,
        caption: Option<String>,
    ) -> Result<CustomOrderImage> {
        self.owned_or_staff(principal, id).await?;
        let image = CustomOrderImage::new(id, url, caption);
        self.store.append_image(&image).await?;
        Ok(image)
    }

    /// Fetches a request the caller may see.
    pub async fn get(&self, principal: Principal, id: CustomOrderId) -> Result<CustomOrder> {
        self.owned_or_staff(principal, id).await
    }

    /// Returns the status history, oldest first.
    pub async fn status_history(
        &self,
        principal: Principal,
        id: CustomOrderId,
    ) -> Result<Vec<StatusHistoryEntry>> {
        self.owned_or_staff(principal, id).await?;
        Ok(self.store.status_history(id).await?)
    }

    /// Returns the message thread, oldest first.
    pub async fn messages(
        &self,
        principal: Principal,
        id: CustomOrderId,
    ) -> Result<Vec<CustomOrderMessage>> {
        self.owned_or_staff(principal, id).await?;
        Ok(self.store.messages(id).await?)
    }

    /// Returns the attached images, oldest first.
    pub async fn images(
        &self,
        principal: Principal,
        id: CustomOrderId,
    ) -> Result<Vec<CustomOrderImage>> {
        self.owned_or_staff(principal, id).await?;
        Ok(self.store.images(id).await?)
    }

    /// Returns a customer's requests, newest first.
    pub async fn for_customer(
        &self,
        principal: Principal,
        customer: CustomerId,
    ) -> Result<Vec<CustomOrder>> {
        if !principal.is_staff() && principal.customer_id() != Some(customer) {
            return Err(CommerceError::AuthenticationRequired);
        }
        Ok(self.store.custom_orders_for_customer(customer).await?)
    }

    /// Fetches a request, admitting staff and the owning customer only. A
    /// foreign request reads as not found.
    async fn owned_or_staff(
        &self,
        principal: Principal,
        id: CustomOrderId,
    ) -> Result<CustomOrder> {
        if principal.is_anonymous() {
            return Err(CommerceError::AuthenticationRequired);
        }
        let request = self.store.get_custom_order(id).await?;
        if !principal.is_staff() && principal.customer_id() != Some(request.customer_id) {
            return Err(StoreError::not_found("custom order", id).into());
        }
        Ok(request)
    }
}
