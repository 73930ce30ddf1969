// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log
//!
//! Every table mutation is expressed as an `Operation` and applied to
//! [`TableState`](crate::state::TableState); durable stores journal the same
//! operations and replay them on open.

use crate::id::{RequesterId, ResourceId, SeatKey};
use crate::store::{DropRecord, OccupancyRecord, ResourceInfo, Subscription};
use crate::version::ChangeVersion;
use crate::waitlist::WaitlistEntry;
use serde::{Deserialize, Serialize};

/// Operations that can be persisted to the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a resource or change its capacity
    ResourceUpsert { resource: ResourceInfo },

    /// Give a requester a seat
    OccupancyInsert { record: OccupancyRecord },

    /// Free a requester's seat
    OccupancyDelete { key: SeatKey },

    /// Record a drop in the audit log
    DropAppend { record: DropRecord },

    /// Free a seat and record its drop in one step
    SeatRelease { record: DropRecord },

    /// Insert a waitlist entry (fresh enqueue or restore after a failed promotion)
    WaitlistInsert {
        resource: ResourceId,
        entry: WaitlistEntry,
    },

    /// Remove a requester from a waitlist (withdrawal or promotion)
    WaitlistRemove {
        resource: ResourceId,
        requester: RequesterId,
    },

    /// Advance a resource's change-version marker
    VersionTouch {
        resource: ResourceId,
        version: ChangeVersion,
    },

    /// Toggle automatic enrollment from the waitlist
    AutoEnrollSet { enabled: bool },

    /// Insert or overwrite a notification subscription
    SubscriptionUpsert { subscription: Subscription },

    /// Delete a notification subscription
    SubscriptionDelete { key: SeatKey },
}

impl Operation {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ResourceUpsert { .. } => "resource:upsert",
            Operation::OccupancyInsert { .. } => "occupancy:insert",
            Operation::OccupancyDelete { .. } => "occupancy:delete",
            Operation::DropAppend { .. } => "drop:append",
            Operation::SeatRelease { .. } => "seat:release",
            Operation::WaitlistInsert { .. } => "waitlist:insert",
            Operation::WaitlistRemove { .. } => "waitlist:remove",
            Operation::VersionTouch { .. } => "version:touch",
            Operation::AutoEnrollSet { .. } => "config:auto_enroll",
            Operation::SubscriptionUpsert { .. } => "subscription:upsert",
            Operation::SubscriptionDelete { .. } => "subscription:delete",
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
