use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::FocusSession;
use crate::timer::ClockMode;
use crate::view::View;

/// Every state change driven by a clock or a view transition produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ClockStarted {
        mode: ClockMode,
        /// Remaining seconds (countdown) or elapsed seconds (stopwatch).
        display_secs: u64,
        at: DateTime<Utc>,
    },
    ClockPaused {
        display_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero on its own.
    ClockCompleted {
        at: DateTime<Utc>,
    },
    ClockReset {
        at: DateTime<Utc>,
    },
    /// A focus session was written to the log.
    SessionCommitted {
        session: FocusSession,
    },
    /// Running time was thrown away by a confirmed view switch.
    ClockDiscarded {
        discarded_secs: u64,
        at: DateTime<Utc>,
    },
    ViewChanged {
        from: View,
        to: View,
        at: DateTime<Utc>,
    },
}
