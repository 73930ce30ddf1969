// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::SeatSource;
use chrono::{TimeZone, Utc};

#[test]
fn occupancy_insert_wire_format_is_stable() {
    let json = r#"{"OccupancyInsert":{"record":{"key":{"resource":"cs101","requester":"amy"},"enrolled_at":"2023-11-14T22:13:20Z","source":"waitlist"}}}"#;

    let op: Operation = serde_json::from_str(json).unwrap();

    match op {
        Operation::OccupancyInsert { record } => {
            assert_eq!(record.key, SeatKey::new("cs101", "amy"));
            assert_eq!(record.source, SeatSource::Waitlist);
            assert_eq!(
                record.enrolled_at,
                Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()
            );
        }
        other => panic!("expected OccupancyInsert, got {:?}", other),
    }
}

#[test]
fn waitlist_entry_keeps_sequence_through_serialization() {
    let op = Operation::WaitlistInsert {
        resource: ResourceId::from("cs101"),
        entry: WaitlistEntry {
            requester: RequesterId::from("amy"),
            enqueued_at: Utc.timestamp_opt(1_700_000_000, 5_000).single().unwrap(),
            sequence: 7,
        },
    };

    let json = serde_json::to_string(&op).unwrap();
    let parsed: Operation = serde_json::from_str(&json).unwrap();
    assert_eq!(op, parsed);
}

#[test]
fn names_are_namespaced() {
    let op = Operation::AutoEnrollSet { enabled: true };
    assert_eq!(op.name(), "config:auto_enroll");
}
