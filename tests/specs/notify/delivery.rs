//! Promotion notice specs
//!
//! Promoted requesters hear about it through every contact they registered.

use crate::prelude::*;

async fn subscribe(campus: &Campus, class_id: &str, who: &str, contact: ContactRequest) {
    campus
        .daemon
        .subscriptions
        .subscribe(&class(class_id), &student(who), contact)
        .await
        .unwrap();
}

#[tokio::test]
async fn promoted_student_is_notified_by_email_and_callback() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    subscribe(
        &campus,
        "cs101",
        "bob",
        ContactRequest {
            email: Some("bob@example.edu".to_string()),
            callback_url: Some("https://hooks.example.edu/bob".to_string()),
        },
    )
    .await;

    campus.drop_class("cs101", "amy").await.unwrap();
    let adapter = FakeNotifyAdapter::new();

    assert_eq!(campus.deliver_pending(&adapter).await, 2);
    let calls = adapter.calls();
    assert_eq!(calls[0].contact, Contact::Email("bob@example.edu".to_string()));
    assert_eq!(
        calls[1].contact,
        Contact::Webhook("https://hooks.example.edu/bob".to_string())
    );
    for call in &calls {
        assert_eq!(call.notice.message, "You are now enrolled in class cs101!");
    }
}

#[tokio::test]
async fn unsubscribed_student_is_promoted_silently() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();

    campus.drop_class("cs101", "amy").await.unwrap();
    let adapter = FakeNotifyAdapter::new();

    assert_eq!(campus.deliver_pending(&adapter).await, 0);
    assert!(adapter.calls().is_empty());
}

#[tokio::test]
async fn failed_delivery_does_not_undo_promotion() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    subscribe(
        &campus,
        "cs101",
        "bob",
        ContactRequest {
            email: Some("bob@example.edu".to_string()),
            callback_url: None,
        },
    )
    .await;

    campus.drop_class("cs101", "amy").await.unwrap();
    let adapter = FakeNotifyAdapter::new();
    adapter.fail_kind("email");

    assert_eq!(campus.deliver_pending(&adapter).await, 0);
    assert_eq!(adapter.calls().len(), 1);
    assert!(matches!(
        campus.enroll("cs101", "bob").await,
        Err(AdmissionError::AlreadyEnrolled(_))
    ));
}

#[tokio::test]
async fn custom_template_is_used() {
    let mut config = RosterConfig::default();
    config.notify.message_template = "{{ requester }}: seat in {{ resource }}".to_string();
    let campus = Campus::open_with(config).await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    subscribe(
        &campus,
        "cs101",
        "bob",
        ContactRequest {
            email: None,
            callback_url: Some("http://localhost:9000/cb".to_string()),
        },
    )
    .await;

    campus.drop_class("cs101", "amy").await.unwrap();
    let adapter = FakeNotifyAdapter::new();
    campus.deliver_pending(&adapter).await;

    assert_eq!(adapter.calls()[0].notice.message, "bob: seat in cs101");
}

#[tokio::test]
async fn subscriptions_are_validated() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    let service = &campus.daemon.subscriptions;

    let missing = service
        .subscribe(&class("cs101"), &student("amy"), ContactRequest::default())
        .await;
    assert_eq!(missing, Err(SubscriptionError::MissingContact));

    let bad_email = service
        .subscribe(
            &class("cs101"),
            &student("amy"),
            ContactRequest {
                email: Some("not-an-email".to_string()),
                callback_url: None,
            },
        )
        .await;
    assert!(matches!(bad_email, Err(SubscriptionError::InvalidEmail(_))));

    let unknown = service
        .subscribe(
            &class("nope"),
            &student("amy"),
            ContactRequest {
                email: Some("amy@example.edu".to_string()),
                callback_url: None,
            },
        )
        .await;
    assert!(matches!(unknown, Err(SubscriptionError::ResourceNotFound(_))));
}
