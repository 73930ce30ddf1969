// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery worker: drains the promotion outbox into notify adapters

use crate::message::MessageTemplate;
use roster_adapters::{Contact, Notice, NotifyAdapter};
use roster_core::store::bounded;
use roster_core::{Outbox, PromotionEvent, SeatKey, Subscription, SubscriptionStore};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Consumes the outbox until it is closed and drained
pub struct DeliveryWorker<S, N> {
    outbox: Outbox,
    store: S,
    adapter: N,
    template: MessageTemplate,
    store_timeout: Duration,
}

impl<S, N> DeliveryWorker<S, N>
where
    S: SubscriptionStore,
    N: NotifyAdapter,
{
    pub fn new(
        outbox: Outbox,
        store: S,
        adapter: N,
        template: MessageTemplate,
        store_timeout: Duration,
    ) -> Self {
        Self {
            outbox,
            store,
            adapter,
            template,
            store_timeout,
        }
    }

    /// Returns the number of successful sends
    pub async fn run(self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.outbox.next().await {
            delivered += self.deliver(&event).await;
        }
        info!(delivered, dropped = self.outbox.dropped(), "delivery worker stopped");
        delivered
    }

    /// One attempt per registered contact; failures are logged, not retried
    pub async fn deliver(&self, event: &PromotionEvent) -> usize {
        let key = SeatKey::new(event.resource.clone(), event.requester.clone());
        let subscription =
            match bounded(self.store_timeout, self.store.subscription(&key)).await {
                Ok(Some(subscription)) => subscription,
                Ok(None) => {
                    debug!(%key, "no subscription, skipping");
                    return 0;
                }
                Err(e) => {
                    warn!(%key, error = %e, "subscription lookup failed");
                    return 0;
                }
            };

        let message = match self.template.render(event) {
            Ok(message) => message,
            Err(e) => {
                warn!(%key, error = %e, "failed to render promotion message");
                return 0;
            }
        };
        let notice = Notice {
            requester: event.requester.clone(),
            resource: event.resource.clone(),
            message,
        };

        let mut sent = 0;
        for contact in contacts(&subscription) {
            match self.adapter.send(&contact, &notice).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(
                    %key,
                    kind = contact.kind(),
                    error = %e,
                    "notification failed"
                ),
            }
        }
        sent
    }
}

/// Email first, then callback
pub fn contacts(subscription: &Subscription) -> Vec<Contact> {
    let email = subscription.email.clone().map(Contact::Email);
    let callback = subscription.callback_url.clone().map(Contact::Webhook);
    email.into_iter().chain(callback).collect()
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
