// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seat admission
//!
//! Per (resource, requester) the controller moves between:
//! - `NotEnrolled -> Enrolled | Waitlisted | rejected`
//! - `Waitlisted -> Enrolled` (promotion) `| NotEnrolled` (removal)
//! - `Enrolled -> NotEnrolled` (drop)

mod controller;
mod error;
mod locks;
mod outcome;

pub use controller::{AdmissionController, AdmissionDeps};
pub use error::AdmissionError;
pub use locks::{ResourceGuard, ResourceLocks};
pub use outcome::{DropReceipt, EnrollOutcome, WaitlistPosition};
