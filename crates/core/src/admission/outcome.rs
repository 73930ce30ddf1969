// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results of admission operations

use crate::version::ChangeVersion;

/// How an enroll request was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A seat was taken
    Enrolled,
    /// Queued; `position` is 1-based
    Waitlisted { position: usize },
}

/// Result of a successful drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReceipt {
    /// Id of the appended drop record
    pub drop_id: String,
    /// Waitlisted requesters seated as a consequence
    pub promoted: usize,
}

/// Answer to a waitlist position query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitlistPosition {
    /// The caller's known version is still current
    NotModified,
    Position {
        /// 1-based
        position: usize,
        version: Option<ChangeVersion>,
    },
    NotOnWaitlist,
}
