//! Shared fixtures for roster specs

pub use roster_adapters::{Contact, FakeNotifyAdapter};
pub use roster_core::{
    AdmissionError, ContactRequest, EnrollOutcome, RequesterId, ResourceId, ResourceInfo,
    ResourceStore, RosterConfig, SubscriptionError, WaitlistPosition,
};
pub use roster_daemon::{startup, DaemonState, LifecycleError, Paths};
use tempfile::TempDir;

pub fn class(id: &str) -> ResourceId {
    ResourceId::from(id)
}

pub fn student(id: &str) -> RequesterId {
    RequesterId::from(id)
}

/// A running daemon over a private state directory
pub struct Campus {
    dir: TempDir,
    config: RosterConfig,
    pub daemon: DaemonState,
}

impl Campus {
    pub async fn open() -> Self {
        Self::open_with(RosterConfig::default()).await
    }

    pub async fn open_with(config: RosterConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let daemon = startup(&config, &Paths::under(dir.path())).await.unwrap();
        Self {
            dir,
            config,
            daemon,
        }
    }

    pub fn paths(&self) -> Paths {
        Paths::under(self.dir.path())
    }

    /// Shut down and start again over the same state directory
    pub async fn restart(self) -> Self {
        let Campus {
            dir,
            config,
            mut daemon,
        } = self;
        daemon.shutdown().await.unwrap();
        drop(daemon);
        let daemon = startup(&config, &Paths::under(dir.path())).await.unwrap();
        Campus {
            dir,
            config,
            daemon,
        }
    }

    /// Shut down, keeping the state directory for inspection
    pub async fn stop(self) -> (TempDir, RosterConfig) {
        let Campus {
            dir,
            config,
            mut daemon,
        } = self;
        daemon.shutdown().await.unwrap();
        (dir, config)
    }

    pub async fn add_class(&self, id: &str, capacity: u32) {
        self.daemon
            .store
            .upsert_resource(ResourceInfo::new(id, capacity))
            .await
            .unwrap();
    }

    pub async fn enroll(&self, class_id: &str, who: &str) -> Result<EnrollOutcome, AdmissionError> {
        self.daemon
            .controller
            .enroll(&class(class_id), &student(who))
            .await
    }

    pub async fn drop_class(&self, class_id: &str, who: &str) -> Result<usize, AdmissionError> {
        self.daemon
            .controller
            .drop(&class(class_id), &student(who))
            .await
            .map(|receipt| receipt.promoted)
    }

    pub async fn position(&self, class_id: &str, who: &str) -> WaitlistPosition {
        self.daemon
            .controller
            .waitlist_position(&class(class_id), &student(who), None)
            .await
            .unwrap()
    }

    /// Run delivery over everything promoted so far
    pub async fn deliver_pending(&self, adapter: &FakeNotifyAdapter) -> usize {
        let worker = self.daemon.delivery_worker(adapter.clone());
        let mut sent = 0;
        while let Some(event) = self.daemon.outbox.try_next() {
            sent += worker.deliver(&event).await;
        }
        sent
    }
}
