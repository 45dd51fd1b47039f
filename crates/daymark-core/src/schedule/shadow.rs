//! Transient completion state shown ahead of the stored value.
//!
//! Pressing "complete" flips the visible state at once; the store toggle is
//! committed once the reconciliation delay has elapsed, and the shadow is
//! then dropped so the stored value shows again.

use std::time::{Duration, Instant};

pub const COMPLETION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionShadow {
    visual: bool,
    due: Option<Instant>,
}

impl CompletionShadow {
    pub fn new(stored: bool) -> Self {
        Self {
            visual: stored,
            due: None,
        }
    }

    /// What the item looks like right now.
    pub fn is_completed(&self) -> bool {
        self.visual
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Flip the visible state and schedule the store toggle. Presses while a
    /// toggle is already pending are ignored and return false.
    pub fn press(&mut self, now: Instant, delay: Duration) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.visual = !self.visual;
        self.due = Some(now + delay);
        true
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.due.is_some_and(|due| now >= due)
    }
}
