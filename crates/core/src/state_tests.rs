// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::SeatSource;
use crate::waitlist::WaitlistEntry;
use chrono::{TimeZone, Utc};

fn enroll(state: &mut TableState, resource: &str, requester: &str) {
    state.apply(&Operation::OccupancyInsert {
        record: OccupancyRecord {
            key: SeatKey::new(resource, requester),
            enrolled_at: Utc::now(),
            source: SeatSource::Direct,
        },
    });
}

#[test]
fn occupancy_is_counted_per_resource() {
    let mut state = TableState::default();
    enroll(&mut state, "cs101", "amy");
    enroll(&mut state, "cs101", "bob");
    enroll(&mut state, "cs1010", "cat");

    assert_eq!(state.occupancy_count(&ResourceId::from("cs101")), 2);
    assert_eq!(state.occupancy_count(&ResourceId::from("cs1010")), 1);
    assert_eq!(state.occupancy_count(&ResourceId::from("cs10")), 0);
}

#[test]
fn occupancy_delete_frees_the_seat() {
    let mut state = TableState::default();
    enroll(&mut state, "cs101", "amy");
    state.apply(&Operation::OccupancyDelete {
        key: SeatKey::new("cs101", "amy"),
    });

    assert_eq!(state.occupancy_count(&ResourceId::from("cs101")), 0);
}

#[test]
fn seat_release_frees_seat_and_logs_drop() {
    let mut state = TableState::default();
    enroll(&mut state, "cs101", "amy");
    enroll(&mut state, "cs101", "bob");
    state.apply(&Operation::SeatRelease {
        record: DropRecord {
            id: "drop-1".to_string(),
            key: SeatKey::new("cs101", "amy"),
            dropped_at: Utc::now(),
            administrative: false,
        },
    });

    assert_eq!(state.occupancy_count(&ResourceId::from("cs101")), 1);
    assert!(!state.occupancy.contains_key(&SeatKey::new("cs101", "amy")));
    assert_eq!(state.drops.len(), 1);
    assert_eq!(state.drops[0].key, SeatKey::new("cs101", "amy"));
}

#[test]
fn waitlist_operations_maintain_quota_index() {
    let mut state = TableState::default();
    state.apply(&Operation::WaitlistInsert {
        resource: ResourceId::from("cs101"),
        entry: WaitlistEntry {
            requester: RequesterId::from("amy"),
            enqueued_at: Utc::now(),
            sequence: 0,
        },
    });
    assert_eq!(state.waitlists.quota_count(&RequesterId::from("amy")), 1);

    state.apply(&Operation::WaitlistRemove {
        resource: ResourceId::from("cs101"),
        requester: RequesterId::from("amy"),
    });
    assert_eq!(state.waitlists.quota_count(&RequesterId::from("amy")), 0);
}

#[test]
fn version_touch_never_moves_backwards() {
    let mut state = TableState::default();
    let resource = ResourceId::from("cs101");
    let newer = ChangeVersion::at(Utc.timestamp_opt(1_700_000_100, 0).single().unwrap());
    let older = ChangeVersion::at(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap());

    state.apply(&Operation::VersionTouch {
        resource: resource.clone(),
        version: newer,
    });
    state.apply(&Operation::VersionTouch {
        resource: resource.clone(),
        version: older,
    });

    assert_eq!(state.versions.get(&resource), Some(&newer));
}

#[test]
fn subscription_upsert_overwrites_without_merge() {
    let mut state = TableState::default();
    let key = SeatKey::new("cs101", "amy");
    state.apply(&Operation::SubscriptionUpsert {
        subscription: Subscription {
            key: key.clone(),
            email: Some("amy@example.edu".to_string()),
            callback_url: None,
        },
    });
    state.apply(&Operation::SubscriptionUpsert {
        subscription: Subscription {
            key: key.clone(),
            email: None,
            callback_url: Some("https://hooks.example.edu/amy".to_string()),
        },
    });

    let stored = &state.subscriptions[&key];
    assert_eq!(stored.email, None);
    assert!(stored.callback_url.is_some());
    assert_eq!(state.subscriptions_for(&RequesterId::from("amy")).count(), 1);
}
