// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rows kept by the table store

use crate::id::{ResourceId, SeatKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capacity-bounded resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: ResourceId,
    pub capacity: u32,
}

impl ResourceInfo {
    pub fn new(id: impl Into<ResourceId>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }
}

/// How an occupancy record came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatSource {
    /// Enrolled directly while a seat was free
    Direct,
    /// Promoted from the head of the waitlist
    Waitlist,
}

/// An active enrollment consuming one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub key: SeatKey,
    pub enrolled_at: DateTime<Utc>,
    pub source: SeatSource,
}

/// Append-only audit entry for a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRecord {
    pub id: String,
    pub key: SeatKey,
    pub dropped_at: DateTime<Utc>,
    /// Dropped by a registrar rather than by the requester
    pub administrative: bool,
}

/// Where to tell a requester about a promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub key: SeatKey,
    pub email: Option<String>,
    pub callback_url: Option<String>,
}
