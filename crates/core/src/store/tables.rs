// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table store over [`TableState`], with pluggable journaling
//!
//! Every mutation is turned into an [`Operation`], handed to the journal, and
//! only then applied to the state. The journal for the in-memory store does
//! nothing; the durable store journals to a WAL.

use super::{
    ConfigStore, DropLog, DropRecord, OccupancyRecord, OccupancyStore, ResourceInfo,
    ResourceStore, StoreError, Subscription, SubscriptionStore, VersionStore, WaitlistStore,
};
use crate::id::{RequesterId, ResourceId, SeatKey};
use crate::operation::Operation;
use crate::state::TableState;
use crate::version::ChangeVersion;
use crate::waitlist::WaitlistEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sink for committed operations
pub trait Journal: Send + 'static {
    fn record(&mut self, op: &Operation) -> Result<(), StoreError>;
}

/// Journal that keeps nothing
#[derive(Debug, Default)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn record(&mut self, _op: &Operation) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory store; contents are lost on drop
pub type MemoryStore = Tables<NullJournal>;

struct Inner<J> {
    state: TableState,
    journal: J,
}

/// Injected faults, used to exercise outage and timeout handling
#[derive(Default)]
struct Faults {
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

/// Table store implementing every store trait
pub struct Tables<J> {
    inner: Arc<Mutex<Inner<J>>>,
    faults: Arc<Faults>,
}

impl<J> Clone for Tables<J> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            faults: Arc::clone(&self.faults),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_journal(TableState::default(), NullJournal)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Journal> Tables<J> {
    /// Wrap existing state (e.g. replayed from a WAL) and a journal
    pub fn with_journal(state: TableState, journal: J) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { state, journal })),
            faults: Arc::new(Faults::default()),
        }
    }

    /// Make every call fail with `Unavailable` until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every call by the given latency
    pub fn set_latency(&self, latency: Duration) {
        self.faults
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Copy of the current state, for inspection
    pub fn snapshot(&self) -> TableState {
        self.lock().state.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<J>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn ready(&self) -> Result<(), StoreError> {
        let latency = self.faults.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&TableState) -> T) -> Result<T, StoreError> {
        self.ready().await?;
        Ok(f(&self.lock().state))
    }

    /// Plan operations against the state, journal them, then apply them.
    ///
    /// Planning and applying happen under one lock, so conditional writes see
    /// no interleaving. The planner may allocate waitlist sequences. Every
    /// operation is journaled before any is applied, so a journal failure
    /// leaves the state untouched.
    async fn write<T>(
        &self,
        plan: impl FnOnce(&mut TableState) -> Result<(Vec<Operation>, T), StoreError>,
    ) -> Result<T, StoreError> {
        self.ready().await?;
        let mut inner = self.lock();
        let (ops, out) = plan(&mut inner.state)?;
        for op in &ops {
            inner.journal.record(op)?;
        }
        for op in &ops {
            inner.state.apply(op);
        }
        Ok(out)
    }
}

#[async_trait]
impl<J: Journal> ResourceStore for Tables<J> {
    async fn resource(&self, id: &ResourceId) -> Result<Option<ResourceInfo>, StoreError> {
        self.read(|s| s.resources.get(id).cloned()).await
    }

    async fn list_resources(&self) -> Result<Vec<ResourceInfo>, StoreError> {
        self.read(|s| s.resources.values().cloned().collect()).await
    }

    async fn upsert_resource(&self, info: ResourceInfo) -> Result<(), StoreError> {
        self.write(|_| Ok((vec![Operation::ResourceUpsert { resource: info }], ())))
            .await
    }
}

#[async_trait]
impl<J: Journal> OccupancyStore for Tables<J> {
    async fn occupancy_count(&self, resource: &ResourceId) -> Result<u32, StoreError> {
        self.read(|s| s.occupancy_count(resource)).await
    }

    async fn occupancy(&self, key: &SeatKey) -> Result<Option<OccupancyRecord>, StoreError> {
        self.read(|s| s.occupancy.get(key).cloned()).await
    }

    async fn occupants(&self, resource: &ResourceId) -> Result<Vec<OccupancyRecord>, StoreError> {
        self.read(|s| s.occupants(resource).cloned().collect()).await
    }

    async fn insert_if_capacity(
        &self,
        record: OccupancyRecord,
        capacity: u32,
    ) -> Result<(), StoreError> {
        self.write(|s| {
            if s.occupancy.contains_key(&record.key) {
                return Err(StoreError::Duplicate(record.key.to_string()));
            }
            if s.occupancy_count(&record.key.resource) >= capacity {
                return Err(StoreError::RaceLost);
            }
            Ok((vec![Operation::OccupancyInsert { record }], ()))
        })
        .await
    }

    async fn delete_occupancy(&self, key: &SeatKey) -> Result<bool, StoreError> {
        self.write(|s| {
            if !s.occupancy.contains_key(key) {
                return Ok((vec![], false));
            }
            Ok((vec![Operation::OccupancyDelete { key: key.clone() }], true))
        })
        .await
    }

    async fn release_seat(&self, record: DropRecord) -> Result<bool, StoreError> {
        self.write(|s| {
            if !s.occupancy.contains_key(&record.key) {
                return Ok((vec![], false));
            }
            Ok((vec![Operation::SeatRelease { record }], true))
        })
        .await
    }
}

#[async_trait]
impl<J: Journal> DropLog for Tables<J> {
    async fn append_drop(&self, record: DropRecord) -> Result<(), StoreError> {
        self.write(|_| Ok((vec![Operation::DropAppend { record }], ())))
            .await
    }

    async fn drops(&self, resource: &ResourceId) -> Result<Vec<DropRecord>, StoreError> {
        self.read(|s| {
            s.drops
                .iter()
                .filter(|d| &d.key.resource == resource)
                .cloned()
                .collect()
        })
        .await
    }
}

#[async_trait]
impl<J: Journal> WaitlistStore for Tables<J> {
    async fn enqueue(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let resource_id = resource.clone();
        self.write(|s| {
            if let Some(rank) = s.waitlists.rank_of(resource, requester) {
                return Ok((vec![], rank));
            }
            let entry = s.waitlists.next_entry(requester, at);
            let rank = s
                .waitlists
                .queue(resource)
                .map_or(0, |queue| queue.insertion_rank(&entry));
            let ops = vec![Operation::WaitlistInsert {
                resource: resource_id,
                entry,
            }];
            Ok((ops, rank))
        })
        .await
    }

    async fn dequeue_head(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        self.write(|s| {
            let Some(head) = s.waitlists.head(resource).cloned() else {
                return Ok((vec![], None));
            };
            let ops = vec![Operation::WaitlistRemove {
                resource: resource.clone(),
                requester: head.requester.clone(),
            }];
            Ok((ops, Some(head)))
        })
        .await
    }

    async fn restore_entry(
        &self,
        resource: &ResourceId,
        entry: WaitlistEntry,
    ) -> Result<(), StoreError> {
        self.write(|_| {
            let ops = vec![Operation::WaitlistInsert {
                resource: resource.clone(),
                entry,
            }];
            Ok((ops, ()))
        })
        .await
    }

    async fn remove_waitlisted(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<bool, StoreError> {
        self.write(|s| {
            if s.waitlists.rank_of(resource, requester).is_none() {
                return Ok((vec![], false));
            }
            let ops = vec![Operation::WaitlistRemove {
                resource: resource.clone(),
                requester: requester.clone(),
            }];
            Ok((ops, true))
        })
        .await
    }

    async fn rank_of(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<Option<usize>, StoreError> {
        self.read(|s| s.waitlists.rank_of(resource, requester)).await
    }

    async fn waitlist_size(&self, resource: &ResourceId) -> Result<usize, StoreError> {
        self.read(|s| s.waitlists.size(resource)).await
    }

    async fn quota_count(&self, requester: &RequesterId) -> Result<usize, StoreError> {
        self.read(|s| s.waitlists.quota_count(requester)).await
    }
}

#[async_trait]
impl<J: Journal> VersionStore for Tables<J> {
    async fn touch(
        &self,
        resource: &ResourceId,
        at: DateTime<Utc>,
    ) -> Result<ChangeVersion, StoreError> {
        self.write(|s| {
            let version = ChangeVersion::advance(s.versions.get(resource).copied(), at);
            let ops = vec![Operation::VersionTouch {
                resource: resource.clone(),
                version,
            }];
            Ok((ops, version))
        })
        .await
    }

    async fn current_version(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<ChangeVersion>, StoreError> {
        self.read(|s| s.versions.get(resource).copied()).await
    }
}

#[async_trait]
impl<J: Journal> ConfigStore for Tables<J> {
    async fn auto_enroll_enabled(&self) -> Result<bool, StoreError> {
        self.read(|s| s.auto_enroll).await
    }

    async fn set_auto_enroll(&self, enabled: bool) -> Result<(), StoreError> {
        self.write(|_| Ok((vec![Operation::AutoEnrollSet { enabled }], ())))
            .await
    }
}

#[async_trait]
impl<J: Journal> SubscriptionStore for Tables<J> {
    async fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError> {
        self.write(|_| Ok((vec![Operation::SubscriptionUpsert { subscription }], ())))
            .await
    }

    async fn subscription(&self, key: &SeatKey) -> Result<Option<Subscription>, StoreError> {
        self.read(|s| s.subscriptions.get(key).cloned()).await
    }

    async fn subscriptions_for(
        &self,
        requester: &RequesterId,
    ) -> Result<Vec<Subscription>, StoreError> {
        self.read(|s| s.subscriptions_for(requester).cloned().collect())
            .await
    }

    async fn delete_subscription(&self, key: &SeatKey) -> Result<bool, StoreError> {
        self.write(|s| {
            if !s.subscriptions.contains_key(key) {
                return Ok((vec![], false));
            }
            Ok((vec![Operation::SubscriptionDelete { key: key.clone() }], true))
        })
        .await
    }
}

#[cfg(test)]
#[path = "tables_tests.rs"]
mod tests;
