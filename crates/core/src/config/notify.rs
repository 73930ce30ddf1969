// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message sent to a requester promoted off a waitlist
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "You are now enrolled in class {{ resource }}!";

/// Promotion outbox and delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Pending promotions kept before the oldest is dropped
    pub outbox_capacity: usize,
    /// minijinja template; `requester` and `resource` are in scope
    pub message_template: String,
    pub smtp: SmtpConfig,
    #[serde(with = "humantime_serde")]
    pub webhook_timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: 1024,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            smtp: SmtpConfig::default(),
            webhook_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub subject: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8025,
            from: "notif@test.com".to_string(),
            subject: "Class Enrollment Notification".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
