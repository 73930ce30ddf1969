// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for admission control

use crate::id::{ResourceId, SeatKey};
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by the admission controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    #[error("not enrolled: {0}")]
    NotEnrolled(SeatKey),
    #[error("not on waitlist: {0}")]
    NotOnWaitlist(SeatKey),
    #[error("already enrolled: {0}")]
    AlreadyEnrolled(SeatKey),
    #[error("waitlist quota exceeded: at most {limit} waitlists per requester")]
    QuotaExceeded { limit: usize },
    #[error("waitlist full: {limit} entries")]
    WaitlistFull { limit: usize },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl AdmissionError {
    /// Caused by the request itself; retrying it unchanged will fail again
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AdmissionError::StorageUnavailable(_))
    }

    /// Backend trouble that may clear on its own
    pub fn is_retryable(&self) -> bool {
        match self {
            AdmissionError::StorageUnavailable(err) => !matches!(err, StoreError::Corrupt(_)),
            _ => false,
        }
    }
}
