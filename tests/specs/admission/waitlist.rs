//! Waitlist specs
//!
//! Freed seats go to the head of the waitlist, one requester per seat.

use crate::prelude::*;

#[tokio::test]
async fn drop_promotes_the_head_of_the_waitlist() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    campus.enroll("cs101", "cat").await.unwrap();

    assert_eq!(campus.drop_class("cs101", "amy").await, Ok(1));

    assert_eq!(campus.position("cs101", "bob").await, WaitlistPosition::NotOnWaitlist);
    assert!(matches!(
        campus.position("cs101", "cat").await,
        WaitlistPosition::Position { position: 1, .. }
    ));
    assert!(matches!(
        campus.enroll("cs101", "bob").await,
        Err(AdmissionError::AlreadyEnrolled(_))
    ));
}

#[tokio::test]
async fn leaving_the_waitlist_closes_the_gap() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    campus.enroll("cs101", "cat").await.unwrap();

    campus
        .daemon
        .controller
        .remove_from_waitlist(&class("cs101"), &student("bob"))
        .await
        .unwrap();

    assert!(matches!(
        campus.position("cs101", "cat").await,
        WaitlistPosition::Position { position: 1, .. }
    ));
    assert!(matches!(
        campus
            .daemon
            .controller
            .remove_from_waitlist(&class("cs101"), &student("bob"))
            .await,
        Err(AdmissionError::NotOnWaitlist(_))
    ));
}

#[tokio::test]
async fn unchanged_waitlist_answers_not_modified() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();

    let WaitlistPosition::Position {
        position: 1,
        version: Some(version),
    } = campus.position("cs101", "bob").await
    else {
        panic!("bob should be first with a version");
    };

    let controller = &campus.daemon.controller;
    let again = controller
        .waitlist_position(&class("cs101"), &student("bob"), Some(&version))
        .await
        .unwrap();
    assert_eq!(again, WaitlistPosition::NotModified);

    campus.enroll("cs101", "cat").await.unwrap();
    let after = controller
        .waitlist_position(&class("cs101"), &student("bob"), Some(&version))
        .await
        .unwrap();
    assert!(matches!(after, WaitlistPosition::Position { position: 1, version: Some(v) } if v > version));
}

#[tokio::test]
async fn auto_enroll_off_leaves_seats_for_manual_promotion() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.add_class("ma201", 1).await;
    campus.daemon.controller.set_auto_enroll(false).await.unwrap();

    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    assert_eq!(campus.drop_class("cs101", "amy").await, Ok(0));
    assert!(matches!(
        campus.position("cs101", "bob").await,
        WaitlistPosition::Position { position: 1, .. }
    ));

    let promoted = campus
        .daemon
        .controller
        .promote_from_waitlist(&[class("cs101"), class("ma201"), class("gone")])
        .await;

    assert_eq!(promoted, 1);
    assert_eq!(campus.position("cs101", "bob").await, WaitlistPosition::NotOnWaitlist);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrolls_never_overfill() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 3).await;

    let handles: Vec<_> = (0..12)
        .map(|n| {
            let controller = campus.daemon.controller.clone();
            tokio::spawn(async move {
                controller
                    .enroll(&class("cs101"), &student(&format!("s{n}")))
                    .await
            })
        })
        .collect();

    let mut enrolled = 0;
    let mut positions = Vec::new();
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            EnrollOutcome::Enrolled => enrolled += 1,
            EnrollOutcome::Waitlisted { position } => positions.push(position),
        }
    }
    positions.sort_unstable();

    assert_eq!(enrolled, 3);
    assert_eq!(positions, (1..=9).collect::<Vec<_>>());
}
