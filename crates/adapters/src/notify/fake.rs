// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Contact, Notice, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Recorded notification
#[derive(Debug, Clone)]
pub struct NotifyCall {
    pub contact: Contact,
    pub notice: Notice,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<NotifyCall>,
    failing: HashSet<&'static str>,
}

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to the given contact kind ("email" or "webhook") fail
    pub fn fail_kind(&self, kind: &'static str) {
        self.lock().failing.insert(kind);
    }

    /// Get all recorded notifications, failed ones included
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn send(&self, contact: &Contact, notice: &Notice) -> Result<(), NotifyError> {
        let mut state = self.lock();
        state.calls.push(NotifyCall {
            contact: contact.clone(),
            notice: notice.clone(),
        });
        if state.failing.contains(contact.kind()) {
            return Err(NotifyError::Http(format!("injected {} failure", contact.kind())));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
