// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource mutual exclusion

use crate::id::ResourceId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<ResourceId, Arc<AsyncMutex<()>>>;

/// One async lock per resource id, held only while someone uses it.
///
/// An entry is created on first use and removed when its last guard drops
/// with nobody else waiting. Clones share the same lock table.
#[derive(Clone, Default)]
pub struct ResourceLocks {
    locks: Arc<Mutex<LockTable>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait for exclusive access to a resource; released when the guard drops
    pub async fn lock(&self, resource: &ResourceId) -> ResourceGuard {
        let lock = Arc::clone(self.table().entry(resource.clone()).or_default());
        let guard = lock.lock_owned().await;
        ResourceGuard {
            guard: Some(guard),
            resource: resource.clone(),
            locks: self.clone(),
        }
    }

    /// Number of resources currently locked or waited on
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one resource
pub struct ResourceGuard {
    guard: Option<OwnedMutexGuard<()>>,
    resource: ResourceId,
    locks: ResourceLocks,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // Release first so the table holds the only remaining handle when idle
        self.guard.take();
        if table
            .get(&self.resource)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.resource);
        }
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
