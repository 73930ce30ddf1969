//! Daemon recovery specs
//!
//! Everything the daemon knows is rebuilt from its WAL on restart.

use crate::prelude::*;
use std::io::Write;

#[tokio::test]
async fn restart_restores_seats_waitlists_and_subscriptions() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    campus.enroll("cs101", "bob").await.unwrap();
    campus.enroll("cs101", "cat").await.unwrap();
    campus
        .daemon
        .subscriptions
        .subscribe(
            &class("cs101"),
            &student("cat"),
            ContactRequest {
                email: Some("cat@example.edu".to_string()),
                callback_url: None,
            },
        )
        .await
        .unwrap();
    let WaitlistPosition::Position {
        version: Some(before),
        ..
    } = campus.position("cs101", "cat").await
    else {
        panic!("cat should be waitlisted");
    };

    let campus = campus.restart().await;

    assert!(matches!(
        campus.enroll("cs101", "amy").await,
        Err(AdmissionError::AlreadyEnrolled(_))
    ));
    assert_eq!(
        campus
            .daemon
            .controller
            .waitlist_position(&class("cs101"), &student("cat"), Some(&before))
            .await
            .unwrap(),
        WaitlistPosition::NotModified
    );

    // Order survives: bob then cat
    campus.drop_class("cs101", "amy").await.unwrap();
    campus.drop_class("cs101", "bob").await.unwrap();
    let adapter = FakeNotifyAdapter::new();
    assert_eq!(campus.deliver_pending(&adapter).await, 1);
    assert_eq!(adapter.calls()[0].notice.requester, student("cat"));
}

#[tokio::test]
async fn second_daemon_on_the_same_state_is_refused() {
    let campus = Campus::open().await;

    let Err(err) = startup(&RosterConfig::default(), &campus.paths()).await else {
        panic!("second daemon should not start");
    };

    assert!(matches!(err, LifecycleError::LockFailed(_)));
}

#[tokio::test]
async fn tampered_log_refuses_to_start() {
    let campus = Campus::open().await;
    campus.add_class("cs101", 1).await;
    campus.enroll("cs101", "amy").await.unwrap();
    let (dir, config) = campus.stop().await;
    let paths = Paths::under(dir.path());
    let state = roster_storage::replay_state(&paths.wal_path).unwrap();
    assert_eq!(state.occupancy.len(), 1);

    let log = std::fs::read_to_string(&paths.wal_path).unwrap();
    let last = log.lines().last().unwrap();
    let mut entry: serde_json::Value = serde_json::from_str(last).unwrap();
    let checksum = entry["checksum"].as_u64().unwrap();
    entry["checksum"] = serde_json::json!(checksum ^ 1);
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&paths.wal_path)
        .unwrap();
    writeln!(file, "{}", entry).unwrap();

    let Err(err) = startup(&config, &paths).await else {
        panic!("tampered log should not load");
    };

    assert!(matches!(err, LifecycleError::Wal(_)));
    assert!(!paths.lock_path.exists());
}
