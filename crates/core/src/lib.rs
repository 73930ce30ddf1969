// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roster-core: seat admission with FIFO waitlists
//!
//! This crate provides:
//! - The capacity ledger and per-resource waitlists
//! - The admission controller (enroll, drop, promote, waitlist queries)
//! - Change-version markers for conditional polling
//! - Store interfaces plus an in-memory table store
//! - The promotion outbox and subscription validation

pub mod clock;
pub mod config;
pub mod id;
pub mod version;

pub mod operation;
pub mod state;
pub mod store;

pub mod admission;
pub mod ledger;
pub mod notify;
pub mod subscription;
pub mod waitlist;

pub use admission::{
    AdmissionController, AdmissionDeps, AdmissionError, DropReceipt, EnrollOutcome,
    ResourceGuard, ResourceLocks, WaitlistPosition,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AdmissionConfig, ConfigError, DaemonConfig, NotifyConfig, RosterConfig, SmtpConfig};
pub use id::{IdGen, RequesterId, ResourceId, SeatKey, SequentialIdGen, UuidIdGen};
pub use ledger::CapacityLedger;
pub use notify::{NoopNotifier, Outbox, PromotionEvent, PromotionNotifier};
pub use operation::Operation;
pub use state::TableState;
pub use store::{
    AdmissionStore, ConfigStore, DropLog, DropRecord, Journal, MemoryStore, NullJournal,
    OccupancyRecord, OccupancyStore, ResourceInfo, ResourceStore, SeatSource, StoreError,
    Subscription, SubscriptionStore, Tables, VersionStore, WaitlistStore,
};
pub use subscription::{ContactRequest, SubscriptionError, SubscriptionService};
pub use version::ChangeVersion;
pub use waitlist::{Waitlist, WaitlistBook, WaitlistEntry, WaitlistQueue};
