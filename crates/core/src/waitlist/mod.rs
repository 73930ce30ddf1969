// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource FIFO waitlists
//!
//! This module provides:
//! - **Waitlist** - One resource's ordered, deduplicated queue of requesters
//! - **WaitlistBook** - All waitlists plus the requester -> resources index
//!   that serves quota checks
//! - **WaitlistQueue** - Resource-scoped handle over a [`WaitlistStore`](crate::store::WaitlistStore)

mod book;
mod queue;

pub use book::WaitlistBook;
pub use queue::WaitlistQueue;

use crate::id::RequesterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A requester waiting for a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub requester: RequesterId,
    pub enqueued_at: DateTime<Utc>,
    /// Store-wide insertion counter; breaks ties between equal timestamps
    pub sequence: u64,
}

impl WaitlistEntry {
    fn order_key(&self) -> (DateTime<Utc>, u64) {
        (self.enqueued_at, self.sequence)
    }
}

/// A single resource's waitlist, ordered by `(enqueued_at, sequence)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Waitlist {
    entries: Vec<WaitlistEntry>,
}

impl Waitlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WaitlistEntry] {
        &self.entries
    }

    pub fn contains(&self, requester: &RequesterId) -> bool {
        self.rank_of(requester).is_some()
    }

    /// 0-based position of a requester
    pub fn rank_of(&self, requester: &RequesterId) -> Option<usize> {
        self.entries.iter().position(|e| &e.requester == requester)
    }

    /// Rank a new entry would take if inserted now
    pub fn insertion_rank(&self, entry: &WaitlistEntry) -> usize {
        let key = entry.order_key();
        self.entries.partition_point(|e| e.order_key() <= key)
    }

    /// Insert an entry at its ordered position and return its rank.
    ///
    /// A requester already present keeps its existing entry and rank.
    pub fn insert(&mut self, entry: WaitlistEntry) -> usize {
        if let Some(rank) = self.rank_of(&entry.requester) {
            return rank;
        }
        let rank = self.insertion_rank(&entry);
        self.entries.insert(rank, entry);
        rank
    }

    /// Remove and return the head of the queue
    pub fn pop_front(&mut self) -> Option<WaitlistEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn remove(&mut self, requester: &RequesterId) -> Option<WaitlistEntry> {
        let rank = self.rank_of(requester)?;
        Some(self.entries.remove(rank))
    }
}

#[cfg(test)]
#[path = "waitlist_tests.rs"]
mod tests;
