// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Roster daemon: lifecycle, promotion delivery and the auto-enroll sweep

pub mod delivery;
pub mod lifecycle;
pub mod message;
pub mod sweep;

pub use delivery::DeliveryWorker;
pub use lifecycle::{
    default_config_path, notify_adapter, startup, DaemonController, DaemonNotifyAdapter,
    DaemonState, LifecycleError, Paths,
};
pub use message::{MessageTemplate, TemplateError};
pub use sweep::sweep_once;
