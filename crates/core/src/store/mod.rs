// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator interfaces for the table store
//!
//! The admission controller never talks to a concrete backend; it receives a
//! store handle implementing these traits at construction time.
//! [`Tables`] implements all of them over an in-memory [`TableState`]
//! (`crate::state`), optionally journaling each mutation.

mod records;
mod tables;

pub use records::{DropRecord, OccupancyRecord, ResourceInfo, SeatSource, Subscription};
pub use tables::{Journal, MemoryStore, NullJournal, Tables};

use crate::id::{RequesterId, ResourceId, SeatKey};
use crate::version::ChangeVersion;
use crate::waitlist::WaitlistEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Backend failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    /// A conditional write found the capacity already used up
    #[error("seat taken by a concurrent writer")]
    RaceLost,
    #[error("record already exists: {0}")]
    Duplicate(String),
    #[error("corrupt store data: {0}")]
    Corrupt(String),
}

/// Run a store call with a deadline; an elapsed deadline is a `Timeout`
pub async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// Resource catalog (class table)
#[async_trait]
pub trait ResourceStore: Clone + Send + Sync + 'static {
    async fn resource(&self, id: &ResourceId) -> Result<Option<ResourceInfo>, StoreError>;
    async fn list_resources(&self) -> Result<Vec<ResourceInfo>, StoreError>;
    async fn upsert_resource(&self, info: ResourceInfo) -> Result<(), StoreError>;
}

/// Occupancy records (enrollment table)
#[async_trait]
pub trait OccupancyStore: Clone + Send + Sync + 'static {
    async fn occupancy_count(&self, resource: &ResourceId) -> Result<u32, StoreError>;
    async fn occupancy(&self, key: &SeatKey) -> Result<Option<OccupancyRecord>, StoreError>;
    async fn occupants(&self, resource: &ResourceId) -> Result<Vec<OccupancyRecord>, StoreError>;

    /// Insert only while fewer than `capacity` records exist for the resource.
    ///
    /// Fails with [`StoreError::RaceLost`] when full and
    /// [`StoreError::Duplicate`] when the key already holds a seat.
    async fn insert_if_capacity(
        &self,
        record: OccupancyRecord,
        capacity: u32,
    ) -> Result<(), StoreError>;

    async fn delete_occupancy(&self, key: &SeatKey) -> Result<bool, StoreError>;

    /// Free the seat named by `record.key` and append `record` to the drop
    /// log as a single write. Returns `false`, writing nothing, when no seat
    /// is held.
    async fn release_seat(&self, record: DropRecord) -> Result<bool, StoreError>;
}

/// Append-only drop audit log (droplist table)
#[async_trait]
pub trait DropLog: Clone + Send + Sync + 'static {
    async fn append_drop(&self, record: DropRecord) -> Result<(), StoreError>;
    async fn drops(&self, resource: &ResourceId) -> Result<Vec<DropRecord>, StoreError>;
}

/// Ordered per-resource waitlists
#[async_trait]
pub trait WaitlistStore: Clone + Send + Sync + 'static {
    /// Append the requester and return its 0-based rank; idempotent
    async fn enqueue(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
        at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    async fn dequeue_head(&self, resource: &ResourceId)
        -> Result<Option<WaitlistEntry>, StoreError>;

    /// Put a dequeued entry back at its original position
    async fn restore_entry(
        &self,
        resource: &ResourceId,
        entry: WaitlistEntry,
    ) -> Result<(), StoreError>;

    async fn remove_waitlisted(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<bool, StoreError>;

    async fn rank_of(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<Option<usize>, StoreError>;

    async fn waitlist_size(&self, resource: &ResourceId) -> Result<usize, StoreError>;

    /// Number of distinct resources whose waitlist holds the requester
    async fn quota_count(&self, requester: &RequesterId) -> Result<usize, StoreError>;
}

/// Per-resource change-version markers
#[async_trait]
pub trait VersionStore: Clone + Send + Sync + 'static {
    /// Advance the resource's marker and return the new value
    async fn touch(
        &self,
        resource: &ResourceId,
        at: DateTime<Utc>,
    ) -> Result<ChangeVersion, StoreError>;

    async fn current_version(
        &self,
        resource: &ResourceId,
    ) -> Result<Option<ChangeVersion>, StoreError>;
}

/// Administrative feature flags (configs table)
#[async_trait]
pub trait ConfigStore: Clone + Send + Sync + 'static {
    async fn auto_enroll_enabled(&self) -> Result<bool, StoreError>;
    async fn set_auto_enroll(&self, enabled: bool) -> Result<(), StoreError>;
}

/// Notification subscriptions, keyed by (resource, requester)
#[async_trait]
pub trait SubscriptionStore: Clone + Send + Sync + 'static {
    /// Insert or overwrite; no merging with an existing row
    async fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError>;
    async fn subscription(&self, key: &SeatKey) -> Result<Option<Subscription>, StoreError>;
    async fn subscriptions_for(
        &self,
        requester: &RequesterId,
    ) -> Result<Vec<Subscription>, StoreError>;
    async fn delete_subscription(&self, key: &SeatKey) -> Result<bool, StoreError>;
}

/// Everything the admission controller needs from one backend
pub trait AdmissionStore:
    ResourceStore + OccupancyStore + DropLog + WaitlistStore + VersionStore + ConfigStore
{
}

impl<T> AdmissionStore for T where
    T: ResourceStore + OccupancyStore + DropLog + WaitlistStore + VersionStore + ConfigStore
{
}
