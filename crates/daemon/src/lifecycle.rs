// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use fs2::FileExt;
use roster_adapters::{
    NotifyAdapter, RoutingNotifyAdapter, SmtpNotifyAdapter, TracedNotifyAdapter,
    WebhookNotifyAdapter,
};
use roster_core::{
    AdmissionController, AdmissionDeps, ConfigStore, DaemonConfig, NotifyConfig, Outbox,
    ResourceId, RosterConfig, StoreError, SubscriptionService, TableState,
};
use roster_storage::{open_durable, DurableStore, WalError};
use thiserror::Error;
use tracing::{info, warn};

use crate::delivery::DeliveryWorker;
use crate::message::{MessageTemplate, TemplateError};

/// Admission controller over the WAL-backed store, notifying through the outbox
pub type DaemonController = AdmissionController<DurableStore, Outbox>;

/// Production delivery: SMTP for email, HTTP for callbacks, both traced
pub type DaemonNotifyAdapter =
    TracedNotifyAdapter<RoutingNotifyAdapter<SmtpNotifyAdapter, WebhookNotifyAdapter>>;

/// On-disk locations owned by the daemon
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
}

impl Paths {
    pub fn resolve(config: &DaemonConfig) -> Result<Self, LifecycleError> {
        let state_dir = match &config.state_dir {
            Some(dir) => dir.clone(),
            None => state_dir()?,
        };
        Ok(Self::under(&state_dir))
    }

    pub fn under(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            lock_path: state_dir.join("rosterd.pid"),
            log_path: state_dir.join("rosterd.log"),
            wal_path: state_dir.join("wal").join("roster.wal"),
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub store: DurableStore,
    pub outbox: Outbox,
    pub controller: DaemonController,
    pub subscriptions: SubscriptionService<DurableStore>,
    pub template: MessageTemplate,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// Worker draining this daemon's outbox through `adapter`
    pub fn delivery_worker<N: NotifyAdapter>(
        &self,
        adapter: N,
    ) -> DeliveryWorker<DurableStore, N> {
        DeliveryWorker::new(
            self.outbox.clone(),
            self.store.clone(),
            adapter,
            self.template.clone(),
            self.controller.config().store_timeout,
        )
    }

    /// Shutdown the daemon gracefully
    ///
    /// Closing the outbox lets the delivery worker finish what is pending.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        self.outbox.close();

        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Message template error: {0}")]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(
    config: &RosterConfig,
    paths: &Paths,
) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config, paths).await {
        Ok(state) => Ok(state),
        // The lock belongs to the running daemon; leave its PID file alone
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            cleanup_on_failure(paths);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(
    config: &RosterConfig,
    paths: &Paths,
) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&paths.state_dir)?;

    // 2. Acquire lock file FIRST - prevents two daemons on one WAL
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Validate the message template before touching state
    let template = MessageTemplate::new(config.notify.message_template.clone())?;

    // 4. Load state from WAL
    if let Some(parent) = paths.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let first_start = !paths.wal_path.exists();
    let store = open_durable(&paths.wal_path)?;

    // 5. Seed the auto-enroll flag; afterwards the stored flag wins
    if first_start {
        store.set_auto_enroll(config.admission.auto_enroll).await?;
        info!(auto_enroll = config.admission.auto_enroll, "Seeded config table");
    }

    let state = store.snapshot();
    info!(
        "Loaded state: {} resources, {} seats, {} drops, {} subscriptions",
        state.resources.len(),
        state.occupancy.len(),
        state.drops.len(),
        state.subscriptions.len()
    );

    // 6. Reconcile: report waitlists the sweep will need to drain
    for (resource, free, waiting) in stranded_waitlists(&state) {
        warn!(
            %resource,
            free,
            waiting,
            auto_enroll = state.auto_enroll,
            "free seats with waiting requesters"
        );
    }

    // 7. Wire the controller to the outbox
    let outbox = Outbox::new(config.notify.outbox_capacity);
    let controller = AdmissionController::new(
        AdmissionDeps::new(store.clone(), outbox.clone()),
        config.admission.clone(),
    );
    let subscriptions = SubscriptionService::new(store.clone(), config.admission.store_timeout);

    info!("Daemon started in {}", paths.state_dir.display());

    Ok(DaemonState {
        paths: paths.clone(),
        lock_file,
        store,
        outbox,
        controller,
        subscriptions,
        template,
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

/// Resources with a free seat and a non-empty waitlist: `(resource, free, waiting)`
pub fn stranded_waitlists(state: &TableState) -> Vec<(ResourceId, u32, usize)> {
    state
        .resources
        .values()
        .filter_map(|info| {
            let free = info.capacity.saturating_sub(state.occupancy_count(&info.id));
            let waiting = state.waitlists.size(&info.id);
            (free > 0 && waiting > 0).then(|| (info.id.clone(), free, waiting))
        })
        .collect()
}

/// Build the production notify adapter from configuration
pub fn notify_adapter(config: &NotifyConfig) -> DaemonNotifyAdapter {
    let smtp = SmtpNotifyAdapter::new(
        config.smtp.host.clone(),
        config.smtp.port,
        config.smtp.from.clone(),
    )
    .with_subject(config.smtp.subject.clone());
    let webhook = WebhookNotifyAdapter::new(config.webhook_timeout);
    TracedNotifyAdapter::new(RoutingNotifyAdapter::new(smtp, webhook))
}

/// Get the state directory for roster
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ROSTER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("roster"))
        .ok_or(LifecycleError::NoStateDir)
}

/// Default config file location (`~/.config/roster/roster.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ROSTER_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("roster").join("roster.toml"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
