// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion notice subscriptions
//!
//! Validates contact details before they reach the [`SubscriptionStore`].

use crate::id::{RequesterId, ResourceId, SeatKey};
use crate::store::{bounded, ResourceStore, StoreError, Subscription, SubscriptionStore};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

// Allow expect here as the regex is a constant valid pattern
#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("at least one of email or callback URL must be provided")]
    MissingContact,
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("invalid callback URL: {0}")]
    InvalidCallback(String),
    #[error("no subscription for {0}")]
    NotFound(SeatKey),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

/// Contact details for one (resource, requester) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequest {
    pub email: Option<String>,
    pub callback_url: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn is_valid_callback(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

#[derive(Clone)]
pub struct SubscriptionService<S> {
    store: S,
    timeout: Duration,
}

impl<S> SubscriptionService<S>
where
    S: ResourceStore + SubscriptionStore,
{
    pub fn new(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Register or replace contacts; an existing subscription is overwritten
    pub async fn subscribe(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
        contact: ContactRequest,
    ) -> Result<Subscription, SubscriptionError> {
        let email = contact.email.filter(|e| !e.trim().is_empty());
        let callback_url = contact.callback_url.filter(|u| !u.trim().is_empty());
        if email.is_none() && callback_url.is_none() {
            return Err(SubscriptionError::MissingContact);
        }
        if bounded(self.timeout, self.store.resource(resource))
            .await?
            .is_none()
        {
            return Err(SubscriptionError::ResourceNotFound(resource.clone()));
        }
        if let Some(email) = email.as_deref().filter(|e| !is_valid_email(e)) {
            return Err(SubscriptionError::InvalidEmail(email.to_string()));
        }
        if let Some(url) = callback_url.as_deref().filter(|u| !is_valid_callback(u)) {
            return Err(SubscriptionError::InvalidCallback(url.to_string()));
        }

        let subscription = Subscription {
            key: SeatKey::new(resource.clone(), requester.clone()),
            email,
            callback_url,
        };
        bounded(
            self.timeout,
            self.store.upsert_subscription(subscription.clone()),
        )
        .await?;
        tracing::info!(%resource, %requester, "subscribed to promotion notices");
        Ok(subscription)
    }

    pub async fn subscriptions(
        &self,
        requester: &RequesterId,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(bounded(self.timeout, self.store.subscriptions_for(requester)).await?)
    }

    pub async fn unsubscribe(
        &self,
        resource: &ResourceId,
        requester: &RequesterId,
    ) -> Result<(), SubscriptionError> {
        let key = SeatKey::new(resource.clone(), requester.clone());
        if !bounded(self.timeout, self.store.delete_subscription(&key)).await? {
            return Err(SubscriptionError::NotFound(key));
        }
        tracing::info!(%resource, %requester, "unsubscribed from promotion notices");
        Ok(())
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
