// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! All waitlists of a store, with a secondary membership index

use super::{Waitlist, WaitlistEntry};
use crate::id::{RequesterId, ResourceId};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// Every resource's waitlist plus a requester -> resources index.
///
/// The index is updated in the same call as the queue it mirrors, so
/// `quota_count` never needs to scan keys.
#[derive(Debug, Clone, Default)]
pub struct WaitlistBook {
    queues: HashMap<ResourceId, Waitlist>,
    memberships: HashMap<RequesterId, BTreeSet<ResourceId>>,
    next_sequence: u64,
}

impl WaitlistBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the entry a fresh enqueue would insert, allocating its sequence.
    ///
    /// The caller persists the entry and then applies it with [`restore`](Self::restore).
    pub fn next_entry(&mut self, requester: &RequesterId, at: DateTime<Utc>) -> WaitlistEntry {
        let entry = WaitlistEntry {
            requester: requester.clone(),
            enqueued_at: at,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        entry
    }

    /// Insert a previously built (or replayed) entry and return its rank
    pub fn restore(&mut self, resource: &ResourceId, entry: WaitlistEntry) -> usize {
        self.next_sequence = self.next_sequence.max(entry.sequence + 1);
        self.memberships
            .entry(entry.requester.clone())
            .or_default()
            .insert(resource.clone());
        self.queues.entry(resource.clone()).or_default().insert(entry)
    }

    pub fn head(&self, resource: &ResourceId) -> Option<&WaitlistEntry> {
        self.queues.get(resource)?.entries().first()
    }

    pub fn remove(&mut self, resource: &ResourceId, requester: &RequesterId) -> bool {
        let Some(queue) = self.queues.get_mut(resource) else {
            return false;
        };
        let removed = queue.remove(requester).is_some();
        if queue.is_empty() {
            self.queues.remove(resource);
        }
        if removed {
            if let Some(resources) = self.memberships.get_mut(requester) {
                resources.remove(resource);
                if resources.is_empty() {
                    self.memberships.remove(requester);
                }
            }
        }
        removed
    }

    pub fn rank_of(&self, resource: &ResourceId, requester: &RequesterId) -> Option<usize> {
        self.queues.get(resource)?.rank_of(requester)
    }

    pub fn size(&self, resource: &ResourceId) -> usize {
        self.queues.get(resource).map_or(0, Waitlist::len)
    }

    /// Number of distinct resources whose waitlist holds the requester
    pub fn quota_count(&self, requester: &RequesterId) -> usize {
        self.memberships.get(requester).map_or(0, BTreeSet::len)
    }

    pub fn queue(&self, resource: &ResourceId) -> Option<&Waitlist> {
        self.queues.get(resource)
    }

    /// Resources with a non-empty waitlist
    pub fn resources(&self) -> impl Iterator<Item = &ResourceId> {
        self.queues.keys()
    }
}

#[cfg(test)]
#[path = "book_tests.rs"]
mod tests;
