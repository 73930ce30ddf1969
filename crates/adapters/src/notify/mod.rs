// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion notice delivery
//!
//! A [`NotifyAdapter`] delivers one rendered message to one contact. Delivery
//! is a single attempt; callers log failures and move on.

mod route;
mod smtp;
mod webhook;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use route::RoutingNotifyAdapter;
pub use smtp::SmtpNotifyAdapter;
pub use webhook::WebhookNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use roster_core::{RequesterId, ResourceId};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out")]
    Timeout,
    #[error("{adapter} cannot deliver to {kind} contacts")]
    Unsupported {
        adapter: &'static str,
        kind: &'static str,
    },
}

/// Where a notice is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Email(String),
    Webhook(String),
}

impl Contact {
    pub fn kind(&self) -> &'static str {
        match self {
            Contact::Email(_) => "email",
            Contact::Webhook(_) => "webhook",
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Contact::Email(address) | Contact::Webhook(address) => address,
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.address())
    }
}

/// A rendered promotion notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub requester: RequesterId,
    pub resource: ResourceId,
    pub message: String,
}

/// Adapter trait for notice delivery
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn send(&self, contact: &Contact, notice: &Notice) -> Result<(), NotifyError>;
}
