// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity ledger: capacity and occupancy per resource
//!
//! Occupancy is always counted from live occupancy records. Backend failures
//! are reported as such and never read as "no free seats".

use crate::admission::AdmissionError;
use crate::id::ResourceId;
use crate::store::{bounded, OccupancyStore, ResourceStore};
use std::time::Duration;

#[derive(Clone)]
pub struct CapacityLedger<S> {
    store: S,
    timeout: Duration,
}

impl<S> CapacityLedger<S>
where
    S: ResourceStore + OccupancyStore,
{
    pub fn new(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn capacity(&self, resource: &ResourceId) -> Result<u32, AdmissionError> {
        bounded(self.timeout, self.store.resource(resource))
            .await?
            .map(|info| info.capacity)
            .ok_or_else(|| AdmissionError::ResourceNotFound(resource.clone()))
    }

    pub async fn occupancy_count(&self, resource: &ResourceId) -> Result<u32, AdmissionError> {
        // Unknown resources have no occupancy worth reporting
        self.capacity(resource).await?;
        Ok(bounded(self.timeout, self.store.occupancy_count(resource)).await?)
    }

    pub async fn free_seats(&self, resource: &ResourceId) -> Result<u32, AdmissionError> {
        let capacity = self.capacity(resource).await?;
        let occupied = bounded(self.timeout, self.store.occupancy_count(resource)).await?;
        Ok(capacity.saturating_sub(occupied))
    }

    pub async fn has_free_seat(&self, resource: &ResourceId) -> Result<bool, AdmissionError> {
        Ok(self.free_seats(resource).await? > 0)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
