// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-version markers for conditional polling
//!
//! Each resource carries a marker that moves forward whenever waitlist
//! positions or occupancy visible to pollers change. Clients echo the last
//! marker they saw; an unchanged resource short-circuits to "not modified".

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A per-resource last-modified marker
///
/// Markers have microsecond precision so that the RFC 3339 text form handed
/// to clients parses back to an identical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeVersion(DateTime<Utc>);

impl ChangeVersion {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self(at.trunc_subsecs(6))
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Next marker for a mutation happening at `now`.
    ///
    /// Always strictly greater than `previous`, even if the clock stalled or
    /// stepped backwards.
    pub fn advance(previous: Option<ChangeVersion>, now: DateTime<Utc>) -> Self {
        let candidate = Self::at(now);
        match previous {
            Some(prev) if candidate <= prev => Self(prev.0 + Duration::microseconds(1)),
            _ => candidate,
        }
    }

    /// Parse a client-supplied marker; empty or malformed input yields `None`
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }

    /// Whether a client holding `known` already has the state at `current`.
    ///
    /// A resource that was never modified has no marker and is always served live.
    pub fn is_fresh(known: Option<&ChangeVersion>, current: Option<&ChangeVersion>) -> bool {
        match (known, current) {
            (Some(known), Some(current)) => known >= current,
            _ => false,
        }
    }
}

impl fmt::Display for ChangeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

impl FromStr for ChangeVersion {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s)?;
        Ok(Self::at(parsed.with_timezone(&Utc)))
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
