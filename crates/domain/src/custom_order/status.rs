//! Custom-order state machine.

use serde::{Deserialize, Serialize};

/// Status of a bespoke made-to-order request.
///
/// State transitions:
/// ```text
/// Submitted ──► InDiscussion ──► QuoteSent ──► QuoteAccepted
///                                                    │
///                          Delivered ◄── Ready ◄── InProduction
/// ```
/// with `Cancelled` reachable from any state prior to `Delivered`.
///
/// Unlike shop orders this lifecycle runs over weeks; every transition is
/// recorded in the request's status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomOrderStatus {
    /// Request received from the customer.
    #[default]
    Submitted,

    /// Staff and customer are refining the design.
    InDiscussion,

    /// A price quote has been sent.
    QuoteSent,

    /// The customer accepted the quote.
    QuoteAccepted,

    /// The artisan is making the piece.
    InProduction,

    /// Finished and awaiting delivery.
    Ready,

    /// Handed over (terminal state).
    Delivered,

    /// Called off (terminal state).
    Cancelled,
}

impl CustomOrderStatus {
    /// Returns the next status on the happy path, if any.
    pub fn next_forward(&self) -> Option<CustomOrderStatus> {
        match self {
            CustomOrderStatus::Submitted => Some(CustomOrderStatus::InDiscussion),
            CustomOrderStatus::InDiscussion => Some(CustomOrderStatus::QuoteSent),
            CustomOrderStatus::QuoteSent => Some(CustomOrderStatus::QuoteAccepted),
            CustomOrderStatus::QuoteAccepted => Some(CustomOrderStatus::InProduction),
            CustomOrderStatus::InProduction => Some(CustomOrderStatus::Ready),
            CustomOrderStatus::Ready => Some(CustomOrderStatus::Delivered),
            CustomOrderStatus::Delivered | CustomOrderStatus::Cancelled => None,
        }
    }

    /// Returns true if the requested transition is legal on the happy path.
    ///
    /// Legal moves are the single forward step and cancellation from any
    /// state prior to delivery. Staff corrections outside this table go
    /// through the explicit override, which is still logged.
    pub fn can_transition_to(&self, next: CustomOrderStatus) -> bool {
        if next == CustomOrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next_forward() == Some(next)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CustomOrderStatus::Delivered | CustomOrderStatus::Cancelled
        )
    }

    /// Returns true if a final price may be recorded in this state.
    pub fn allows_final_price(&self) -> bool {
        matches!(
            self,
            CustomOrderStatus::QuoteAccepted
                | CustomOrderStatus::InProduction
                | CustomOrderStatus::Ready
                | CustomOrderStatus::Delivered
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomOrderStatus::Submitted => "submitted",
            CustomOrderStatus::InDiscussion => "in_discussion",
            CustomOrderStatus::QuoteSent => "quote_sent",
            CustomOrderStatus::QuoteAccepted => "quote_accepted",
            CustomOrderStatus::InProduction => "in_production",
            CustomOrderStatus::Ready => "ready",
            CustomOrderStatus::Delivered => "delivered",
            CustomOrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string form, rejecting anything outside
    /// the known set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(CustomOrderStatus::Submitted),
            "in_discussion" => Some(CustomOrderStatus::InDiscussion),
            "quote_sent" => Some(CustomOrderStatus::QuoteSent),
            "quote_accepted" => Some(CustomOrderStatus::QuoteAccepted),
            "in_production" => Some(CustomOrderStatus::InProduction),
            "ready" => Some(CustomOrderStatus::Ready),
            "delivered" => Some(CustomOrderStatus::Delivered),
            "cancelled" => Some(CustomOrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CustomOrderStatus; 8] = [
        CustomOrderStatus::Submitted,
        CustomOrderStatus::InDiscussion,
        CustomOrderStatus::QuoteSent,
        CustomOrderStatus::QuoteAccepted,
        CustomOrderStatus::InProduction,
        CustomOrderStatus::Ready,
        CustomOrderStatus::Delivered,
        CustomOrderStatus::Cancelled,
    ];

    #[test]
    fn test_happy_path_chain() {
        let mut status = CustomOrderStatus::Submitted;
        let mut steps = 0;
        while let Some(next) = status.next_forward() {
            assert!(status.can_transition_to(next));
            status = next;
            steps += 1;
        }
        assert_eq!(status, CustomOrderStatus::Delivered);
        assert_eq!(steps, 6);
    }

    #[test]
    fn test_no_skipping() {
        assert!(!CustomOrderStatus::Submitted.can_transition_to(CustomOrderStatus::QuoteSent));
        assert!(!CustomOrderStatus::Submitted.can_transition_to(CustomOrderStatus::Delivered));
        assert!(!CustomOrderStatus::QuoteSent.can_transition_to(CustomOrderStatus::InProduction));
    }

    #[test]
    fn test_cancelled_reachable_before_delivery() {
        for status in ALL {
            if status.is_terminal() {
                assert!(!status.can_transition_to(CustomOrderStatus::Cancelled));
            } else {
                assert!(status.can_transition_to(CustomOrderStatus::Cancelled));
            }
        }
    }

    #[test]
    fn test_final_price_window() {
        assert!(!CustomOrderStatus::Submitted.allows_final_price());
        assert!(!CustomOrderStatus::QuoteSent.allows_final_price());
        assert!(CustomOrderStatus::QuoteAccepted.allows_final_price());
        assert!(CustomOrderStatus::InProduction.allows_final_price());
        assert!(CustomOrderStatus::Delivered.allows_final_price());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in ALL {
            assert_eq!(CustomOrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CustomOrderStatus::parse("quoting"), None);
    }
}
