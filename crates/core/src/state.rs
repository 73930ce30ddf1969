// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized table state built from operations

use crate::id::{RequesterId, ResourceId, SeatKey};
use crate::operation::Operation;
use crate::store::{DropRecord, OccupancyRecord, ResourceInfo, Subscription};
use crate::version::ChangeVersion;
use crate::waitlist::WaitlistBook;
use std::collections::{BTreeMap, HashMap};

/// All tables, as produced by applying operations in order
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub resources: BTreeMap<ResourceId, ResourceInfo>,
    pub occupancy: BTreeMap<SeatKey, OccupancyRecord>,
    pub drops: Vec<DropRecord>,
    pub waitlists: WaitlistBook,
    pub versions: HashMap<ResourceId, ChangeVersion>,
    pub auto_enroll: bool,
    pub subscriptions: BTreeMap<SeatKey, Subscription>,
}

impl TableState {
    /// Occupancy records of one resource, in requester order
    pub fn occupants<'a>(
        &'a self,
        resource: &'a ResourceId,
    ) -> impl Iterator<Item = &'a OccupancyRecord> + 'a {
        self.occupancy
            .range(SeatKey::first_of(resource)..)
            .take_while(move |(key, _)| &key.resource == resource)
            .map(|(_, record)| record)
    }

    /// Occupancy is always counted from the records, never cached
    pub fn occupancy_count(&self, resource: &ResourceId) -> u32 {
        self.occupants(resource).count() as u32
    }

    pub fn subscriptions_for<'a>(
        &'a self,
        requester: &'a RequesterId,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        self.subscriptions
            .values()
            .filter(move |s| &s.key.requester == requester)
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::ResourceUpsert { resource } => {
                self.resources.insert(resource.id.clone(), resource.clone());
            }

            Operation::OccupancyInsert { record } => {
                self.occupancy.insert(record.key.clone(), record.clone());
            }

            Operation::OccupancyDelete { key } => {
                self.occupancy.remove(key);
            }

            Operation::DropAppend { record } => {
                self.drops.push(record.clone());
            }

            Operation::SeatRelease { record } => {
                self.occupancy.remove(&record.key);
                self.drops.push(record.clone());
            }

            Operation::WaitlistInsert { resource, entry } => {
                self.waitlists.restore(resource, entry.clone());
            }

            Operation::WaitlistRemove {
                resource,
                requester,
            } => {
                self.waitlists.remove(resource, requester);
            }

            Operation::VersionTouch { resource, version } => {
                let current = self.versions.entry(resource.clone()).or_insert(*version);
                // Replayed markers never move a resource backwards
                if *version > *current {
                    *current = *version;
                }
            }

            Operation::AutoEnrollSet { enabled } => {
                self.auto_enroll = *enabled;
            }

            Operation::SubscriptionUpsert { subscription } => {
                self.subscriptions
                    .insert(subscription.key.clone(), subscription.clone());
            }

            Operation::SubscriptionDelete { key } => {
                self.subscriptions.remove(key);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
