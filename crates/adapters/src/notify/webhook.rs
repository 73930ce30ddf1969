// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON callback delivery over HTTP

use super::{Contact, Notice, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::time::Duration;

/// POSTs `{requester_id, resource_id, message}` to the callback URL
#[derive(Clone)]
pub struct WebhookNotifyAdapter {
    agent: ureq::Agent,
}

impl WebhookNotifyAdapter {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }

    fn body(notice: &Notice) -> String {
        serde_json::json!({
            "requester_id": notice.requester.0,
            "resource_id": notice.resource.0,
            "message": notice.message,
        })
        .to_string()
    }
}

#[async_trait]
impl NotifyAdapter for WebhookNotifyAdapter {
    async fn send(&self, contact: &Contact, notice: &Notice) -> Result<(), NotifyError> {
        let Contact::Webhook(url) = contact else {
            return Err(NotifyError::Unsupported {
                adapter: "webhook",
                kind: contact.kind(),
            });
        };
        let agent = self.agent.clone();
        let url = url.clone();
        let body = Self::body(notice);

        // ureq blocks; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(body.as_str())
                .map(|_| ())
                .map_err(|e| NotifyError::Http(format!("POST {} failed: {}", url, e)))
        })
        .await
        .map_err(|e| NotifyError::Http(format!("delivery task failed: {}", e)))?
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
