//! Enrollment specs
//!
//! Seats go to whoever asks while capacity lasts; everyone else queues.

use crate::prelude::*;

#[tokio::test]
async fn enroll_takes_a_free_seat() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 2).await;

    assert_eq!(campus.enroll("cs101", "amy").await, Ok(EnrollOutcome::Enrolled));
    assert_eq!(campus.enroll("cs101", "bob").await, Ok(EnrollOutcome::Enrolled));
    assert_eq!(
        campus.daemon.controller.ledger().free_seats(&class("cs101")).await,
        Ok(0)
    );
}

#[tokio::test]
async fn full_class_waitlists_in_arrival_order() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;

    campus.enroll("cs101", "amy").await.unwrap();

    assert_eq!(
        campus.enroll("cs101", "bob").await,
        Ok(EnrollOutcome::Waitlisted { position: 1 })
    );
    assert_eq!(
        campus.enroll("cs101", "cat").await,
        Ok(EnrollOutcome::Waitlisted { position: 2 })
    );
    // Asking again does not move anyone
    assert_eq!(
        campus.enroll("cs101", "bob").await,
        Ok(EnrollOutcome::Waitlisted { position: 1 })
    );
}

#[tokio::test]
async fn enrolling_twice_is_rejected() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 3).await;

    campus.enroll("cs101", "amy").await.unwrap();

    assert!(matches!(
        campus.enroll("cs101", "amy").await,
        Err(AdmissionError::AlreadyEnrolled(_))
    ));
}

#[tokio::test]
async fn unknown_class_is_not_found() {
    let campus = Campus::open().await;

    let err = campus.enroll("nope", "amy").await.unwrap_err();

    assert_eq!(err, AdmissionError::ResourceNotFound(class("nope")));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn fourth_waitlist_exceeds_quota() {
    let campus = Campus::open().await;
    for id in ["a", "b", "c", "d"] {
        campus.add_class(id, 1).await;
        campus.enroll(id, "holder").await.unwrap();
    }

    for id in ["a", "b", "c"] {
        assert_eq!(
            campus.enroll(id, "amy").await,
            Ok(EnrollOutcome::Waitlisted { position: 1 })
        );
    }

    assert_eq!(
        campus.enroll("d", "amy").await,
        Err(AdmissionError::QuotaExceeded { limit: 3 })
    );
}

#[tokio::test]
async fn waitlist_stops_at_its_capacity() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "holder").await.unwrap();

    for n in 1..=15 {
        assert_eq!(
            campus.enroll("cs101", &format!("s{n}")).await,
            Ok(EnrollOutcome::Waitlisted { position: n })
        );
    }

    assert_eq!(
        campus.enroll("cs101", "late").await,
        Err(AdmissionError::WaitlistFull { limit: 15 })
    );
}

#[tokio::test]
async fn dropping_frees_the_seat_for_someone_else() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;

    campus.enroll("cs101", "amy").await.unwrap();
    assert_eq!(campus.drop_class("cs101", "amy").await, Ok(0));

    assert_eq!(campus.enroll("cs101", "bob").await, Ok(EnrollOutcome::Enrolled));
}

#[tokio::test]
async fn dropping_without_a_seat_is_rejected() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;

    assert!(matches!(
        campus.drop_class("cs101", "amy").await,
        Err(AdmissionError::NotEnrolled(_))
    ));
}
