//! The authenticated actor behind an operation.
//!
//! Every mutating operation in the core takes a [`Principal`] explicitly.
//! There is no ambient session state: the caller's identity provider
//! resolves the session and hands the result in.

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, StaffId};

/// The acting user, as resolved by the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    /// No signed-in session. Denied all mutating operations.
    Anonymous,

    /// A signed-in shopper.
    Customer { id: CustomerId },

    /// A signed-in staff member.
    Staff { id: StaffId },
}

impl Principal {
    /// Creates a customer principal.
    pub fn customer(id: CustomerId) -> Self {
        Principal::Customer { id }
    }

    /// Creates a staff principal.
    pub fn staff(id: StaffId) -> Self {
        Principal::Staff { id }
    }

    /// Returns the customer ID if this is a signed-in customer.
    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Principal::Customer { id } => Some(*id),
            _ => None,
        }
    }

    /// Returns the staff ID if this is a signed-in staff member.
    pub fn staff_id(&self) -> Option<StaffId> {
        match self {
            Principal::Staff { id } => Some(*id),
            _ => None,
        }
    }

    /// Returns true if no one is signed in.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// Returns true if this is a staff member.
    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::Staff { .. })
    }

    /// Returns a short label for audit trails.
    pub fn label(&self) -> String {
        match self {
            Principal::Anonymous => "anonymous".to_string(),
            Principal::Customer { id } => format!("customer:{id}"),
            Principal::Staff { id } => format!("staff:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_principal() {
        let id = CustomerId::new();
        let principal = Principal::customer(id);
        assert_eq!(principal.customer_id(), Some(id));
        assert!(principal.staff_id().is_none());
        assert!(!principal.is_anonymous());
        assert!(!principal.is_staff());
    }

    #[test]
    fn test_staff_principal() {
        let id = StaffId::new();
        let principal = Principal::staff(id);
        assert!(principal.is_staff());
        assert_eq!(principal.staff_id(), Some(id));
        assert!(principal.customer_id().is_none());
    }

    #[test]
    fn test_anonymous_principal() {
        let principal = Principal::Anonymous;
        assert!(principal.is_anonymous());
        assert!(principal.customer_id().is_none());
        assert_eq!(principal.label(), "anonymous");
    }
}
