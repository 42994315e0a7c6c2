//! Custom (made-to-order) request types.

mod status;

pub use status::CustomOrderStatus;

use chrono::{DateTime, Utc};
use common::{CustomOrderId, CustomerId, Money};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// A bespoke request running from submission to delivery over weeks.
///
/// The request is never deleted; it terminates into `delivered` or
/// `cancelled`. The per-state timestamps are conveniences set once, at
/// first entry into each state. The status history is the audit trail
/// and the only source of "when did X happen" queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOrder {
    /// Request identifier.
    pub id: CustomOrderId,

    /// Requesting customer.
    pub customer_id: CustomerId,

    /// Short title for lists.
    pub title: String,

    /// Design requirements in the customer's words.
    pub requirements: String,

    /// Lower bound of the customer's budget.
    pub budget_min: Money,

    /// Upper bound of the customer's budget.
    pub budget_max: Money,

    /// Requested timeline, free-form ("6 weeks", "before Diwali").
    pub timeline: String,

    /// Current lifecycle status.
    pub status: CustomOrderStatus,

    /// Price estimate, set while preparing a quote.
    pub estimated_price: Option<Money>,

    /// Agreed price. Set at `quote_accepted` or later, immutable once set.
    pub final_price: Option<Money>,

    /// Submission time.
    pub created_at: DateTime<Utc>,

    /// First entry into `in_discussion`.
    pub discussion_started_at: Option<DateTime<Utc>>,

    /// First entry into `quote_sent`.
    pub quote_sent_at: Option<DateTime<Utc>>,

    /// First entry into `quote_accepted`.
    pub quote_accepted_at: Option<DateTime<Utc>>,

    /// First entry into `in_production`.
    pub production_started_at: Option<DateTime<Utc>>,

    /// First entry into `ready`.
    pub ready_at: Option<DateTime<Utc>>,

    /// Delivery time.
    pub delivered_at: Option<DateTime<Utc>>,

    /// Cancellation time.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl CustomOrder {
    /// Creates a freshly submitted request.
    pub fn new(
        customer_id: CustomerId,
        title: impl Into<String>,
        requirements: impl Into<String>,
        budget_min: Money,
        budget_max: Money,
        timeline: impl Into<String>,
    ) -> Self {
        Self {
            id: CustomOrderId::new(),
            customer_id,
            title: title.into(),
            requirements: requirements.into(),
            budget_min,
            budget_max,
            timeline: timeline.into(),
            status: CustomOrderStatus::Submitted,
            estimated_price: None,
            final_price: None,
            created_at: Utc::now(),
            discussion_started_at: None,
            quote_sent_at: None,
            quote_accepted_at: None,
            production_started_at: None,
            ready_at: None,
            delivered_at: None,
            cancelled_at: None,
        }
    }

    /// Validates a status change.
    ///
    /// With `override_chain` set (explicit staff correction) the happy-path
    /// table is bypassed, but a delivered request still admits no change.
    pub fn validate_transition(
        &self,
        next: CustomOrderStatus,
        override_chain: bool,
    ) -> Result<(), DomainError> {
        let legal = if override_chain {
            self.status != CustomOrderStatus::Delivered && next != self.status
        } else {
            self.status.can_transition_to(next)
        };

        if legal {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "custom_order",
                from: self.status.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// Applies a validated status change, stamping the milestone timestamp
    /// for `next` only on first entry.
    pub fn apply_status(&mut self, next: CustomOrderStatus, at: DateTime<Utc>) {
        self.status = next;
        let slot = match next {
            CustomOrderStatus::Submitted => return,
            CustomOrderStatus::InDiscussion => &mut self.discussion_started_at,
            CustomOrderStatus::QuoteSent => &mut self.quote_sent_at,
            CustomOrderStatus::QuoteAccepted => &mut self.quote_accepted_at,
            CustomOrderStatus::InProduction => &mut self.production_started_at,
            CustomOrderStatus::Ready => &mut self.ready_at,
            CustomOrderStatus::Delivered => &mut self.delivered_at,
            CustomOrderStatus::Cancelled => &mut self.cancelled_at,
        };
        if slot.is_none() {
            *slot = Some(at);
        }
    }

    /// Records the price estimate prepared for the quote.
    ///
    /// Estimates stay revisable through the discussion, but freeze once a
    /// final price exists.
    pub fn set_estimated_price(&mut self, price: Money) -> Result<(), DomainError> {
        if self.final_price.is_some() {
            return Err(DomainError::ImmutableFieldViolation {
                field: "estimated_price",
            });
        }
        self.estimated_price = Some(price);
        Ok(())
    }

    /// Records the agreed price. Only legal at `quote_accepted` or later,
    /// and only once.
    pub fn set_final_price(&mut self, price: Money) -> Result<(), DomainError> {
        if self.final_price.is_some() {
            return Err(DomainError::ImmutableFieldViolation {
                field: "final_price",
            });
        }
        if !self.status.allows_final_price() {
            return Err(DomainError::FinalPriceTooEarly {
                status: self.status.as_str(),
            });
        }
        self.final_price = Some(price);
        Ok(())
    }
}

/// One append-only row in a request's status history audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// Entry identifier.
    pub id: Uuid,

    /// Owning request.
    pub custom_order_id: CustomOrderId,

    /// The status entered.
    pub status: CustomOrderStatus,

    /// Optional staff notes.
    pub notes: Option<String>,

    /// Who made the change (principal label).
    pub changed_by: String,

    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    /// Creates a history row stamped with the current time.
    pub fn new(
        custom_order_id: CustomOrderId,
        status: CustomOrderStatus,
        notes: Option<String>,
        changed_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            custom_order_id,
            status,
            notes,
            changed_by: changed_by.into(),
            changed_at: Utc::now(),
        }
    }
}

/// One message in a request's communication thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOrderMessage {
    /// Message identifier.
    pub id: Uuid,

    /// Owning request.
    pub custom_order_id: CustomOrderId,

    /// Who sent it (principal label).
    pub sender: String,

    /// Message body.
    pub body: String,

    /// When it was sent.
    pub sent_at: DateTime<Utc>,
}

impl CustomOrderMessage {
    /// Creates a message stamped with the current time.
    pub fn new(
        custom_order_id: CustomOrderId,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            custom_order_id,
            sender: sender.into(),
            body: body.into(),
            sent_at: Utc::now(),
        }
    }
}

/// A reference image attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOrderImage {
    /// Image identifier.
    pub id: Uuid,

    /// Owning request.
    pub custom_order_id: CustomOrderId,

    /// Where the upload lives.
    pub url: String,

    /// Optional caption.
    pub caption: Option<String>,

    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl CustomOrderImage {
    /// Creates an image row stamped with the current time.
    pub fn new(
        custom_order_id: CustomOrderId,
        url: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            custom_order_id,
            url: url.into(),
            caption,
            uploaded_at: Utc::now(),
        }
    }
}
