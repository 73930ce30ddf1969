// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules
//!
//! `RosterConfig` is read from a TOML file. Every field has a default, and a
//! missing file yields the defaults.

mod notify;

pub use notify::{NotifyConfig, SmtpConfig, DEFAULT_MESSAGE_TEMPLATE};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub admission: AdmissionConfig,
    pub notify: NotifyConfig,
    pub daemon: DaemonConfig,
}

impl RosterConfig {
    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.admission.waitlist_capacity == 0 {
            return Err(ConfigError::Invalid(
                "admission.waitlist_capacity must be at least 1".to_string(),
            ));
        }
        if self.admission.store_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "admission.store_timeout must be non-zero".to_string(),
            ));
        }
        if self.daemon.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "daemon.sweep_interval must be non-zero".to_string(),
            ));
        }
        if self.notify.outbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notify.outbox_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Admission rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Distinct waitlists a requester may be on at once
    pub max_waitlists_per_requester: usize,
    /// Entries allowed on a single resource's waitlist
    pub waitlist_capacity: usize,
    /// Deadline for each store call
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,
    /// Seeds the auto-enroll flag the first time a store is opened
    pub auto_enroll: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_waitlists_per_requester: 3,
            waitlist_capacity: 15,
            store_timeout: Duration::from_secs(2),
            auto_enroll: true,
        }
    }
}

/// Daemon process settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Where the WAL, lock file and log live; platform state dir when unset
    pub state_dir: Option<PathBuf>,
    /// How often waitlists are swept for promotable entries
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
