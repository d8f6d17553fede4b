// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Door and motion status of a car.
///
/// `Closed` covers both idle and parked-between-moves; a car flips to
/// `Between` for the duration of each one-floor movement step. The ASCII
/// names appear only on the wire and in the shared record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorStatus {
    Opening,
    Open,
    Closing,
    Closed,
    Between,
}

impl DoorStatus {
    /// All five statuses, in no particular order.
    pub const ALL: [DoorStatus; 5] =
        [Self::Opening, Self::Open, Self::Closing, Self::Closed, Self::Between];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Open => "Open",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
            Self::Between => "Between",
        }
    }

    /// Parse an ASCII status name. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
