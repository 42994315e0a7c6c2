//! Custom-order lifecycle integration tests against the in-memory store.

use commerce::{CommerceError, CustomOrderService};
use common::{CustomerId, Money, Principal, StaffId};
use domain::{CustomOrder, CustomOrderStatus, DomainError};
use store::MemoryStore;

struct Env {
    service: CustomOrderService<MemoryStore>,
    customer: Principal,
    staff: Principal,
}

impl Env {
    fn new() -> Self {
        Self {
            service: CustomOrderService::new(MemoryStore::new()),
            customer: Principal::customer(CustomerId::new()),
            staff: Principal::staff(StaffId::new()),
        }
    }

    async fn submit(&self) -> CustomOrder {
        self.service
            .submit(
                self.customer,
                "Bridal dupatta",
                "Hand-embroidered, red and gold, peacock motifs",
                Money::from_rupees(3000),
                Money::from_rupees(5000),
                "8 weeks",
            )
            .await
            .unwrap()
    }

    async fn advance_to(&self, request: &CustomOrder, target: CustomOrderStatus) {
        let chain = [
            CustomOrderStatus::InDiscussion,
            CustomOrderStatus::QuoteSent,
            CustomOrderStatus::QuoteAccepted,
            CustomOrderStatus::InProduction,
            CustomOrderStatus::Ready,
            CustomOrderStatus::Delivered,
        ];
        for next in chain {
            self.service
                .transition(self.staff, request.id, next, None, false)
                .await
                .unwrap();
            if next == target {
                break;
            }
        }
    }
}

#[tokio::test]
async fn submission_opens_the_history() {
    let env = Env::new();
    let request = env.submit().await;

    assert_eq!(request.status, CustomOrderStatus::Submitted);

    let history = env
        .service
        .status_history(env.customer, request.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, CustomOrderStatus::Submitted);
    assert!(history[0].changed_by.starts_with("customer:"));
}

#[tokio::test]
async fn every_transition_lands_in_the_history() {
    let env = Env::new();
    let request = env.submit().await;

    env.service
        .transition(
            env.staff,
            request.id,
            CustomOrderStatus::InDiscussion,
            Some("Discussed motifs on call".to_string()),
            false,
        )
        .await
        .unwrap();
    env.service
        .transition(env.staff, request.id, CustomOrderStatus::QuoteSent, None, false)
        .await
        .unwrap();

    let history = env
        .service
        .status_history(env.staff, request.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].notes.as_deref(), Some("Discussed motifs on call"));
    assert!(history[1].changed_by.starts_with("staff:"));
}

#[tokio::test]
async fn skipping_states_needs_the_override() {
    let env = Env::new();
    let request = env.submit().await;

    let err = env
        .service
        .transition(
            env.staff,
            request.id,
            CustomOrderStatus::InProduction,
            None,
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Domain(DomainError::InvalidTransition { .. })
    ));

    // The correction is allowed when explicit, and still audited.
    let corrected = env
        .service
        .transition(
            env.staff,
            request.id,
            CustomOrderStatus::InProduction,
            Some("Order taken over the phone last week".to_string()),
            true,
        )
        .await
        .unwrap();
    assert_eq!(corrected.status, CustomOrderStatus::InProduction);

    let history = env
        .service
        .status_history(env.staff, request.id)
        .await
        .unwrap();
    assert_eq!(history.last().unwrap().status, CustomOrderStatus::InProduction);
}

#[tokio::test]
async fn delivered_requests_cannot_be_resurrected() {
    let env = Env::new();
    let request = env.submit().await;
    env.advance_to(&request, CustomOrderStatus::Delivered).await;

    let err = env
        .service
        .transition(env.staff, request.id, CustomOrderStatus::Ready, None, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Domain(DomainError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn milestones_survive_reentry() {
    let env = Env::new();
    let request = env.submit().await;

    env.service
        .transition(env.staff, request.id, CustomOrderStatus::InDiscussion, None, false)
        .await
        .unwrap();
    let after_first = env.service.get(env.staff, request.id).await.unwrap();
    let first_entry = after_first.discussion_started_at.unwrap();

    env.service
        .transition(env.staff, request.id, CustomOrderStatus::QuoteSent, None, false)
        .await
        .unwrap();
    env.service
        .transition(env.staff, request.id, CustomOrderStatus::InDiscussion, None, true)
        .await
        .unwrap();

    let after_reentry = env.service.get(env.staff, request.id).await.unwrap();
    assert_eq!(after_reentry.discussion_started_at, Some(first_entry));
}

#[tokio::test]
async fn final_price_rules() {
    let env = Env::new();
    let request = env.submit().await;

    // Too early: no accepted quote yet.
    let err = env
        .service
        .set_final_price(env.staff, request.id, Money::from_rupees(4200))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Domain(DomainError::FinalPriceTooEarly { .. })
    ));

    env.service
        .set_estimated_price(env.staff, request.id, Money::from_rupees(4000))
        .await
        .unwrap();
    env.advance_to(&request, CustomOrderStatus::QuoteAccepted).await;

    env.service
        .set_final_price(env.staff, request.id, Money::from_rupees(4200))
        .await
        .unwrap();

    // Immutable once set; the estimate freezes too.
    let err = env
        .service
        .set_final_price(env.staff, request.id, Money::from_rupees(4500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Domain(DomainError::ImmutableFieldViolation {
            field: "final_price"
        })
    ));
    let err = env
        .service
        .set_estimated_price(env.staff, request.id, Money::from_rupees(4500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Domain(DomainError::ImmutableFieldViolation {
            field: "estimated_price"
        })
    ));

    let stored = env.service.get(env.staff, request.id).await.unwrap();
    assert_eq!(stored.final_price, Some(Money::from_rupees(4200)));
}

#[tokio::test]
async fn customers_can_cancel_their_own_requests() {
    let env = Env::new();
    let request = env.submit().await;

    let cancelled = env
        .service
        .cancel(env.customer, request.id, Some("Changed my mind".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, CustomOrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
}

#[tokio::test]
async fn thread_and_images_are_append_only_and_scoped() {
    let env = Env::new();
    let request = env.submit().await;

    env.service
        .add_message(env.customer, request.id, "Can the border be wider?")
        .await
        .unwrap();
    env.service
        .add_message(env.staff, request.id, "Yes, adding 2cm to the border.")
        .await
        .unwrap();
    env.service
        .add_image(
            env.customer,
            request.id,
            "https://example.org/reference.jpg",
            Some("Border style we like".to_string()),
        )
        .await
        .unwrap();

    let messages = env.service.messages(env.customer, request.id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].sender.starts_with("customer:"));
    assert!(messages[1].sender.starts_with("staff:"));

    assert_eq!(env.service.images(env.customer, request.id).await.unwrap().len(), 1);

    // A different customer cannot even see the request.
    let stranger = Principal::customer(CustomerId::new());
    let err = env
        .service
        .add_message(stranger, request.id, "hello")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Store(store::StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn transitions_are_staff_only() {
    let env = Env::new();
    let request = env.submit().await;

    let err = env
        .service
        .transition(
            env.customer,
            request.id,
            CustomOrderStatus::InDiscussion,
            None,
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::StaffRequired));
}
