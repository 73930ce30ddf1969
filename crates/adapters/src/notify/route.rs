// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Contact, Notice, NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Sends email contacts to one adapter and webhook contacts to another
#[derive(Clone)]
pub struct RoutingNotifyAdapter<E, W> {
    email: E,
    webhook: W,
}

impl<E, W> RoutingNotifyAdapter<E, W> {
    pub fn new(email: E, webhook: W) -> Self {
        Self { email, webhook }
    }
}

#[async_trait]
impl<E: NotifyAdapter, W: NotifyAdapter> NotifyAdapter for RoutingNotifyAdapter<E, W> {
    async fn send(&self, contact: &Contact, notice: &Notice) -> Result<(), NotifyError> {
        match contact {
            Contact::Email(_) => self.email.send(contact, notice).await,
            Contact::Webhook(_) => self.webhook.send(contact, notice).await,
        }
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
