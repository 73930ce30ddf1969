// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion notifications
//!
//! The admission controller hands a [`PromotionEvent`] to a
//! [`PromotionNotifier`] after each promotion. The handoff never blocks and
//! never fails the promotion. [`Outbox`] is the production notifier: a
//! bounded in-process queue that drops its oldest event when full, drained by
//! the daemon's delivery worker.

use crate::id::{RequesterId, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A waitlisted requester was given a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionEvent {
    pub requester: RequesterId,
    pub resource: ResourceId,
    pub promoted_at: DateTime<Utc>,
}

/// Receives promotion events; must return promptly
pub trait PromotionNotifier: Clone + Send + Sync + 'static {
    fn notify(&self, event: PromotionEvent);
}

/// Notifier that discards every event
#[derive(Clone, Debug, Default)]
pub struct NoopNotifier;

impl PromotionNotifier for NoopNotifier {
    fn notify(&self, _event: PromotionEvent) {}
}

struct Shared {
    queue: Mutex<VecDeque<PromotionEvent>>,
    capacity: usize,
    dropped: AtomicU64,
    closed: AtomicBool,
    ready: Notify,
}

/// Bounded drop-oldest queue of promotion events.
///
/// Any number of producers; one consumer calling [`Outbox::next`].
#[derive(Clone)]
pub struct Outbox {
    shared: Arc<Shared>,
}

impl Outbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity: capacity.max(1),
                dropped: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                ready: Notify::new(),
            }),
        }
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<PromotionEvent>> {
        self.shared.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Events discarded because the outbox was full
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::SeqCst)
    }

    pub fn try_next(&self) -> Option<PromotionEvent> {
        self.queue().pop_front()
    }

    /// Wait for the next event; `None` once closed and drained
    pub async fn next(&self) -> Option<PromotionEvent> {
        loop {
            if let Some(event) = self.try_next() {
                return Some(event);
            }
            if self.shared.closed.load(Ordering::SeqCst) {
                return None;
            }
            self.shared.ready.notified().await;
        }
    }

    /// Stop accepting events; pending ones can still be drained
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.ready.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl PromotionNotifier for Outbox {
    fn notify(&self, event: PromotionEvent) {
        if self.is_closed() {
            tracing::warn!(
                resource = %event.resource,
                requester = %event.requester,
                "outbox closed, promotion notice discarded"
            );
            return;
        }
        {
            let mut queue = self.queue();
            if queue.len() >= self.shared.capacity {
                if let Some(oldest) = queue.pop_front() {
                    self.shared.dropped.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(
                        resource = %oldest.resource,
                        requester = %oldest.requester,
                        capacity = self.shared.capacity,
                        "outbox full, dropped oldest promotion notice"
                    );
                }
            }
            queue.push_back(event);
        }
        self.shared.ready.notify_one();
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
