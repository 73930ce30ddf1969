// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! One JSON entry per line. Each entry carries a CRC32 of its serialized
//! operation; replay refuses an entry whose checksum does not match.

use roster_core::{Journal, Operation, StoreError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("checksum mismatch at line {line}")]
    Checksum { line: usize },
}

impl From<WalError> for StoreError {
    fn from(err: WalError) -> Self {
        match err {
            WalError::Io(e) => StoreError::Unavailable(e.to_string()),
            e @ (WalError::Json(_) | WalError::Checksum { .. }) => {
                StoreError::Corrupt(e.to_string())
            }
        }
    }
}

/// Write-ahead log for durable operation storage
pub struct Wal {
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL at the given path
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        // Count existing entries to set sequence number
        let reader = BufReader::new(File::open(path)?);
        let mut sequence = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                sequence += 1;
            }
        }

        Ok(Self { file, sequence })
    }

    /// Append an operation and flush it to disk
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let entry = WalEntry::new(self.sequence + 1, op.clone())?;
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replay all operations from the log
    pub fn replay(path: &Path) -> Result<Vec<Operation>, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut ops = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line)?;
            if !entry.verify()? {
                return Err(WalError::Checksum { line: index + 1 });
            }
            ops.push(entry.op);
        }

        Ok(ops)
    }
}

impl Journal for Wal {
    fn record(&mut self, op: &Operation) -> Result<(), StoreError> {
        self.append(op)?;
        Ok(())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct WalEntry {
    seq: u64,
    op: Operation,
    checksum: u32,
}

impl WalEntry {
    fn new(seq: u64, op: Operation) -> Result<Self, WalError> {
        let checksum = checksum(&op)?;
        Ok(Self { seq, op, checksum })
    }

    fn verify(&self) -> Result<bool, WalError> {
        Ok(self.checksum == checksum(&self.op)?)
    }
}

fn checksum(op: &Operation) -> Result<u32, WalError> {
    Ok(crc32fast::hash(serde_json::to_string(op)?.as_bytes()))
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
