//! Turns ticked seconds into committed focus sessions.
//!
//! Every active interval (start to pause, start to finish, start to natural
//! completion) is committed on its own; resumed runs are never merged into
//! the previous entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::FocusSession;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionAccountant {
    /// Seconds accrued since the last commit.
    pending_secs: u64,
}

impl SessionAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_secs(&self) -> u64 {
        self.pending_secs
    }

    /// A new active interval begins.
    pub fn begin(&mut self) {
        self.pending_secs = 0;
    }

    pub fn record_tick(&mut self) {
        self.pending_secs += 1;
    }

    /// Close the current interval. Emits a session only if time was accrued.
    pub fn commit(&mut self, tag: Option<&str>, at: DateTime<Utc>) -> Option<FocusSession> {
        let pending = std::mem::take(&mut self.pending_secs);
        if pending == 0 {
            return None;
        }
        Some(FocusSession::new(pending, tag.map(str::to_string), at))
    }

    /// Drop the current interval without logging it. Returns the discarded seconds.
    pub fn discard(&mut self) -> u64 {
        std::mem::take(&mut self.pending_secs)
    }
}
