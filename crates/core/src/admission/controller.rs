// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission controller
//!
//! Every mutating operation on a resource runs under that resource's lock.
//! Occupancy inserts are also conditional at the store, so capacity holds
//! even against writers that bypass this controller.

use super::{AdmissionError, DropReceipt, EnrollOutcome, ResourceLocks, WaitlistPosition};
use crate::clock::{Clock, SystemClock};
use crate::config::AdmissionConfig;
use crate::id::{IdGen, RequesterId, ResourceId, SeatKey, UuidIdGen};
use crate::ledger::CapacityLedger;
use crate::notify::{PromotionEvent, PromotionNotifier};
use crate::store::{
    bounded, AdmissionStore, DropRecord, OccupancyRecord, SeatSource, StoreError,
};
use crate::version::ChangeVersion;
use crate::waitlist::WaitlistQueue;
use std::future::Future;

/// Collaborators handed to the controller at construction
pub struct AdmissionDeps<S, N, C = SystemClock, G = UuidIdGen> {
    pub store: S,
    pub notifier: N,
    pub clock: C,
    pub ids: G,
}

impl<S, N> AdmissionDeps<S, N> {
    /// Production clock and id generator
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            clock: SystemClock,
            ids: UuidIdGen,
        }
    }
}

/// Orchestrates enroll, drop, promotion and waitlist queries
#[derive(Clone)]
pub struct AdmissionController<S, N, C = SystemClock, G = UuidIdGen> {
    store: S,
    notifier: N,
    clock: C,
    ids: G,
    ledger: CapacityLedger<S>,
    locks: ResourceLocks,
    config: AdmissionConfig,
}

impl<S, N, C, G> AdmissionController<S, N, C, G>
where
    S: AdmissionStore,
    N: PromotionNotifier,
    C: Clock,
    G: IdGen,
{
    pub fn new(deps: AdmissionDeps<S, N, C, G>, config: AdmissionConfig) -> Self {
        Self {
            ledger: CapacityLedger::new(deps.store.clone(), config.store_timeout),
            store: deps.store,
            notifier: deps.notifier,
            clock: deps.clock,
            ids: deps.ids,
            locks: ResourceLocks::new(),
            config,
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &CapacityLedger<S> {
        &self.ledger
    }

    pub fn waitlist(&self, resource: &ResourceId) -> WaitlistQueue<S> {
        WaitlistQueue::new(
            self.store.clone(),
            resource.clone(),
            self.config.store_timeout,
        )
    }

    async fn call<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        bounded(self.config.store_timeout, op).await
    }

    /// Take a seat, or join the waitlist when none is free
    pub async fn enroll(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<EnrollOutcome, AdmissionError> {
        let _guard = self.locks.lock(resource).await;
        let capacity = self.ledger.capacity(resource).await?;
        let key = SeatKey::new(resource.clone(), requester.clone());

        if self.call(self.store.occupancy(&key)).await?.is_some() {
            return Err(AdmissionError::AlreadyEnrolled(key));
        }

        let queue = self.waitlist(resource);
        if let Some(rank) = queue.rank_of(requester).await? {
            return Ok(EnrollOutcome::Waitlisted { position: rank + 1 });
        }

        let occupied = self.call(self.store.occupancy_count(resource)).await?;
        if occupied < capacity {
            let record = OccupancyRecord {
                key: key.clone(),
                enrolled_at: self.clock.now(),
                source: SeatSource::Direct,
            };
            match self.call(self.store.insert_if_capacity(record, capacity)).await {
                Ok(()) => {
                    tracing::info!(%resource, %requester, "enrolled");
                    self.refresh_marker(resource).await;
                    return Ok(EnrollOutcome::Enrolled);
                }
                Err(StoreError::RaceLost) => {
                    tracing::info!(%resource, %requester, "seat taken concurrently, waitlisting");
                }
                Err(StoreError::Duplicate(_)) => return Err(AdmissionError::AlreadyEnrolled(key)),
                Err(e) => return Err(e.into()),
            }
        }

        self.join_waitlist(&queue, requester).await
    }

    async fn join_waitlist(
        &self,
        queue: &WaitlistQueue<S>,
        requester: &RequesterId,
    ) -> Result<EnrollOutcome, AdmissionError> {
        let limit = self.config.max_waitlists_per_requester;
        if queue.quota_count(requester).await? >= limit {
            return Err(AdmissionError::QuotaExceeded { limit });
        }

        let capacity = self.config.waitlist_capacity;
        if queue.size().await? >= capacity {
            return Err(AdmissionError::WaitlistFull { limit: capacity });
        }

        let rank = queue.enqueue(requester, self.clock.now()).await?;
        tracing::info!(
            resource = %queue.resource(),
            %requester,
            position = rank + 1,
            "waitlisted"
        );
        self.refresh_marker(queue.resource()).await;
        Ok(EnrollOutcome::Waitlisted { position: rank + 1 })
    }

    /// Give up a seat; promotes from the waitlist when auto-enroll is on
    pub async fn drop(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<DropReceipt, AdmissionError> {
        self.release(resource, requester, false).await
    }

    /// Drop on behalf of an administrator; recorded as administrative
    pub async fn drop_administratively(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<DropReceipt, AdmissionError> {
        self.release(resource, requester, true).await
    }

    async fn release(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
        administrative: bool,
    ) -> Result<DropReceipt, AdmissionError> {
        let _guard = self.locks.lock(resource).await;
        let capacity = self.ledger.capacity(resource).await?;
        let key = SeatKey::new(resource.clone(), requester.clone());

        if self.call(self.store.occupancy(&key)).await?.is_none() {
            return Err(AdmissionError::NotEnrolled(key));
        }

        let drop_id = self.ids.next();
        let record = DropRecord {
            id: drop_id.clone(),
            key: key.clone(),
            dropped_at: self.clock.now(),
            administrative,
        };
        // Seat and audit record go together or not at all
        if !self.call(self.store.release_seat(record)).await? {
            return Err(AdmissionError::NotEnrolled(key));
        }
        tracing::info!(%resource, %requester, administrative, %drop_id, "dropped");

        let promoted = match self.call(self.store.auto_enroll_enabled()).await {
            Ok(true) => self.promote_locked(resource, capacity).await,
            Ok(false) => 0,
            Err(e) => {
                tracing::warn!(%resource, error = %e, "auto-enroll flag unreadable, skipping promotion");
                0
            }
        };

        self.refresh_marker(resource).await;
        Ok(DropReceipt { drop_id, promoted })
    }

    /// Fill free seats from the head of the waitlist
    pub async fn promote(&self, resource: &ResourceId) -> Result<usize, AdmissionError> {
        let _guard = self.locks.lock(resource).await;
        let capacity = self.ledger.capacity(resource).await?;
        let promoted = self.promote_locked(resource, capacity).await;
        if promoted > 0 {
            self.refresh_marker(resource).await;
        }
        Ok(promoted)
    }

    /// Promote across several resources; unknown or failing ones are skipped
    pub async fn promote_from_waitlist(&self, resources: &[ResourceId]) -> usize {
        let mut total = 0;
        for resource in resources {
            match self.promote(resource).await {
                Ok(promoted) => total += promoted,
                Err(AdmissionError::ResourceNotFound(_)) => {
                    tracing::warn!(%resource, "skipping promotion for unknown resource");
                }
                Err(e) => {
                    tracing::warn!(%resource, error = %e, "promotion failed");
                }
            }
        }
        total
    }

    /// Promote on every known resource
    pub async fn promote_all(&self) -> Result<usize, AdmissionError> {
        let resources: Vec<ResourceId> = self
            .call(self.store.list_resources())
            .await?
            .into_iter()
            .map(|info| info.id)
            .collect();
        Ok(self.promote_from_waitlist(&resources).await)
    }

    /// Caller must hold the resource lock.
    ///
    /// Stops at the first store failure; seats already granted stay granted.
    async fn promote_locked(&self, resource: &ResourceId, capacity: u32) -> usize {
        let occupied = match self.call(self.store.occupancy_count(resource)).await {
            Ok(occupied) => occupied,
            Err(e) => {
                tracing::warn!(%resource, error = %e, "cannot count occupancy, skipping promotion");
                return 0;
            }
        };
        let mut free = capacity.saturating_sub(occupied);
        let queue = self.waitlist(resource);
        let mut promoted = 0;

        while free > 0 {
            let entry = match queue.dequeue_head().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(%resource, error = %e, "cannot read waitlist head");
                    break;
                }
            };

            let promoted_at = self.clock.now();
            let record = OccupancyRecord {
                key: SeatKey::new(resource.clone(), entry.requester.clone()),
                enrolled_at: promoted_at,
                source: SeatSource::Waitlist,
            };
            match self.call(self.store.insert_if_capacity(record, capacity)).await {
                Ok(()) => {
                    free -= 1;
                    promoted += 1;
                    tracing::info!(%resource, requester = %entry.requester, "promoted from waitlist");
                    self.notifier.notify(PromotionEvent {
                        requester: entry.requester,
                        resource: resource.clone(),
                        promoted_at,
                    });
                }
                Err(StoreError::Duplicate(_)) => {
                    tracing::info!(
                        %resource,
                        requester = %entry.requester,
                        "waitlisted requester already seated, entry discarded"
                    );
                }
                Err(e) => {
                    tracing::warn!(%resource, requester = %entry.requester, error = %e, "promotion stopped");
                    let requester = entry.requester.clone();
                    if let Err(restore) = queue.restore(entry).await {
                        tracing::error!(%resource, %requester, error = %restore, "waitlist entry lost");
                    }
                    break;
                }
            }
        }

        promoted
    }

    /// Leave a waitlist
    pub async fn remove_from_waitlist(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<(), AdmissionError> {
        let _guard = self.locks.lock(resource).await;
        if !self.waitlist(resource).remove(requester).await? {
            return Err(AdmissionError::NotOnWaitlist(SeatKey::new(
                resource.clone(),
                requester.clone(),
            )));
        }
        tracing::info!(%resource, %requester, "removed from waitlist");
        self.refresh_marker(resource).await;
        Ok(())
    }

    /// 1-based waitlist position, or `NotModified` when `known` is current
    pub async fn waitlist_position(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
        known: Option<&ChangeVersion>,
    ) -> Result<WaitlistPosition, AdmissionError> {
        let current = self.call(self.store.current_version(resource)).await?;
        if ChangeVersion::is_fresh(known, current.as_ref()) {
            return Ok(WaitlistPosition::NotModified);
        }
        match self.waitlist(resource).rank_of(requester).await? {
            Some(rank) => Ok(WaitlistPosition::Position {
                position: rank + 1,
                version: current,
            }),
            None => Ok(WaitlistPosition::NotOnWaitlist),
        }
    }

    pub async fn auto_enroll_enabled(&self) -> Result<bool, AdmissionError> {
        Ok(self.call(self.store.auto_enroll_enabled()).await?)
    }

    pub async fn set_auto_enroll(&self, enabled: bool) -> Result<(), AdmissionError> {
        self.call(self.store.set_auto_enroll(enabled)).await?;
        tracing::info!(enabled, "auto-enroll updated");
        Ok(())
    }

    /// Marker failures after a committed change are logged only
    async fn refresh_marker(&self, resource: &ResourceId) {
        if let Err(e) = self.call(self.store.touch(resource, self.clock.now())).await {
            tracing::warn!(%resource, error = %e, "failed to refresh change marker");
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
