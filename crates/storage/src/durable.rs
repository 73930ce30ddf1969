// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed table store

use crate::wal::{Wal, WalError};
use roster_core::{TableState, Tables};
use std::path::Path;

/// Table store whose mutations are journaled to a [`Wal`]
pub type DurableStore = Tables<Wal>;

/// Rebuild state from the log at `path`, then keep appending to it
pub fn open_durable(path: &Path) -> Result<DurableStore, WalError> {
    let state = replay_state(path)?;
    let wal = Wal::open(path)?;
    Ok(Tables::with_journal(state, wal))
}

/// Materialize the tables recorded in a log without opening it for writes
pub fn replay_state(path: &Path) -> Result<TableState, WalError> {
    let mut state = TableState::default();
    for op in Wal::replay(path)? {
        state.apply(&op);
    }
    Ok(state)
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
