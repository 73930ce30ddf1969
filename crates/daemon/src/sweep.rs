// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic auto-enroll sweep
//!
//! Catches seats freed by writers outside the controller (capacity raised,
//! records removed by hand) by promoting on every resource.

use roster_core::{
    AdmissionController, AdmissionError, AdmissionStore, Clock, IdGen, PromotionNotifier,
};

/// Promote everywhere if auto-enroll is on; returns the number promoted
pub async fn sweep_once<S, N, C, G>(
    controller: &AdmissionController<S, N, C, G>,
) -> Result<usize, AdmissionError>
where
    S: AdmissionStore,
    N: PromotionNotifier,
    C: Clock,
    G: IdGen,
{
    if !controller.auto_enroll_enabled().await? {
        tracing::debug!("auto-enroll disabled, skipping sweep");
        return Ok(0);
    }
    let promoted = controller.promote_all().await?;
    if promoted > 0 {
        tracing::info!(promoted, "sweep promoted waitlisted requesters");
    }
    Ok(promoted)
}

#[cfg(test)]
#[path = "sweep_tests.rs"]
mod tests;
