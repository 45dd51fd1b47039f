//! Focus session log and statistics.
//!
//! Sessions are appended by the timers and deleted one at a time from the
//! stats view. Aggregation is a pure projection over the log: today's
//! sessions, per-tag totals, all-time total and whole-day milestones.

mod aggregate;
mod session;

pub use aggregate::{
    aggregate_by_tag, format_duration, milestones, Milestones, TagTotal, TodaySummary,
    SECONDS_PER_DAY, UNTAGGED,
};
pub use session::{FocusSession, SessionLog};
