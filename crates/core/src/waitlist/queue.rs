// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource-scoped waitlist handle

use super::WaitlistEntry;
use crate::id::{RequesterId, ResourceId};
use crate::store::{bounded, StoreError, WaitlistStore};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One resource's waitlist, backed by a [`WaitlistStore`].
///
/// Every call is bounded by the store timeout. Ranks are 0-based.
#[derive(Clone)]
pub struct WaitlistQueue<S> {
    store: S,
    resource: ResourceId,
    timeout: Duration,
}

impl<S: WaitlistStore> WaitlistQueue<S> {
    pub fn new(store: S, resource: ResourceId, timeout: Duration) -> Self {
        Self {
            store,
            resource,
            timeout,
        }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Join the queue; an existing member keeps its rank
    pub async fn enqueue(
        &self,
        requester: &RequesterId,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        bounded(self.timeout, self.store.enqueue(&self.resource, requester, at)).await
    }

    pub async fn dequeue_head(&self) -> Result<Option<WaitlistEntry>, StoreError> {
        bounded(self.timeout, self.store.dequeue_head(&self.resource)).await
    }

    /// Return an entry taken by [`Self::dequeue_head`] to its old position
    pub async fn restore(&self, entry: WaitlistEntry) -> Result<(), StoreError> {
        bounded(self.timeout, self.store.restore_entry(&self.resource, entry)).await
    }

    pub async fn remove(&self, requester: &RequesterId) -> Result<bool, StoreError> {
        bounded(
            self.timeout,
            self.store.remove_waitlisted(&self.resource, requester),
        )
        .await
    }

    pub async fn rank_of(&self, requester: &RequesterId) -> Result<Option<usize>, StoreError> {
        bounded(self.timeout, self.store.rank_of(&self.resource, requester)).await
    }

    pub async fn size(&self) -> Result<usize, StoreError> {
        bounded(self.timeout, self.store.waitlist_size(&self.resource)).await
    }

    /// Waitlists the requester belongs to, across all resources
    pub async fn quota_count(&self, requester: &RequesterId) -> Result<usize, StoreError> {
        bounded(self.timeout, self.store.quota_count(requester)).await
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
