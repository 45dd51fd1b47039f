//! Session clock implementation.
//!
//! The clock is a one-second-granularity state machine. It does not own a
//! thread or a timer: the caller is responsible for calling `tick()` once per
//! elapsed second while the clock is running (see [`super::Ticker`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ...
//!            |
//!            +-> Completed (countdown reached zero) -> Running
//! ```
//!
//! `reset()` returns to `Idle` from any state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;

/// Upper bound for any countdown length: 999 minutes.
pub const MAX_CLOCK_SECS: u64 = 999 * 60;

/// One scroll step on the time editor.
pub const WHEEL_STEP_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Counts down from a configured duration.
    Countdown,
    /// Counts up from zero without a target.
    Stopwatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero. `start()` reloads the duration.
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    mode: ClockMode,
    state: ClockState,
    /// Configured target in seconds (countdown only).
    duration_secs: u64,
    remaining_secs: u64,
    elapsed_secs: u64,
}

impl SessionClock {
    /// Create an idle countdown clock. The duration is clamped to [`MAX_CLOCK_SECS`].
    pub fn countdown(duration_secs: u64) -> Self {
        let duration_secs = duration_secs.min(MAX_CLOCK_SECS);
        Self {
            mode: ClockMode::Countdown,
            state: ClockState::Idle,
            duration_secs,
            remaining_secs: duration_secs,
            elapsed_secs: 0,
        }
    }

    /// Create an idle stopwatch at zero.
    pub fn stopwatch() -> Self {
        Self {
            mode: ClockMode::Stopwatch,
            state: ClockState::Idle,
            duration_secs: 0,
            remaining_secs: 0,
            elapsed_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// The number shown to the user: remaining for a countdown, elapsed for a stopwatch.
    pub fn display_secs(&self) -> u64 {
        match self.mode {
            ClockMode::Countdown => self.remaining_secs,
            ClockMode::Stopwatch => self.elapsed_secs,
        }
    }

    /// 1.0 .. 0.0 fraction of the countdown still left (drives the progress ring).
    pub fn fraction_left(&self) -> f64 {
        if self.mode == ClockMode::Stopwatch || self.duration_secs == 0 {
            return 0.0;
        }
        self.remaining_secs as f64 / self.duration_secs as f64
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. A countdown sitting at zero reloads its duration first;
    /// a zero-length countdown completes immediately without ticking.
    pub fn start(&mut self) -> Option<Event> {
        if self.state == ClockState::Running {
            return None;
        }
        if self.mode == ClockMode::Countdown && self.remaining_secs == 0 {
            self.remaining_secs = self.duration_secs;
            if self.remaining_secs == 0 {
                self.state = ClockState::Completed;
                return Some(Event::ClockCompleted { at: Utc::now() });
            }
        }
        self.state = ClockState::Running;
        Some(Event::ClockStarted {
            mode: self.mode,
            display_secs: self.display_secs(),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != ClockState::Running {
            return None;
        }
        self.state = ClockState::Paused;
        Some(Event::ClockPaused {
            display_secs: self.display_secs(),
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.state = ClockState::Idle;
        self.remaining_secs = self.duration_secs;
        self.elapsed_secs = 0;
        Event::ClockReset { at: Utc::now() }
    }

    /// Advance by one second. Returns `Some(Event::ClockCompleted)` when a
    /// countdown reaches zero; the clock is stopped at that point.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != ClockState::Running {
            return None;
        }
        self.elapsed_secs += 1;
        if self.mode == ClockMode::Countdown {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
            if self.remaining_secs == 0 {
                self.state = ClockState::Completed;
                return Some(Event::ClockCompleted { at: Utc::now() });
            }
        }
        None
    }

    /// Pick a new countdown length (preset or edited value). Resets the clock.
    ///
    /// # Errors
    /// Rejected while the clock is running.
    pub fn set_duration(&mut self, secs: u64) -> Result<(), ValidationError> {
        if self.is_running() {
            return Err(ValidationError::ClockRunning);
        }
        self.duration_secs = secs.min(MAX_CLOCK_SECS);
        self.reset();
        Ok(())
    }

    /// Manually edit the displayed time while stopped. On a countdown this
    /// sets the remaining seconds; on a stopwatch it sets elapsed seconds.
    ///
    /// # Errors
    /// Rejected while the clock is running.
    pub fn set_remaining(&mut self, secs: u64) -> Result<(), ValidationError> {
        if self.is_running() {
            return Err(ValidationError::ClockRunning);
        }
        let secs = secs.min(MAX_CLOCK_SECS);
        match self.mode {
            ClockMode::Countdown => {
                self.remaining_secs = secs;
                if self.state == ClockState::Completed && secs > 0 {
                    self.state = ClockState::Paused;
                }
            }
            ClockMode::Stopwatch => self.elapsed_secs = secs,
        }
        Ok(())
    }
}

/// Parse the time editor's text. A bare number is minutes, `M:S` is minutes
/// and seconds. The result is clamped to `0..=MAX_CLOCK_SECS`; anything else
/// returns `None` and the edit is abandoned.
pub fn parse_clock_input(input: &str) -> Option<u64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let secs: i64 = match parts.as_slice() {
        [m] => m.trim().parse::<i64>().ok()?.checked_mul(60)?,
        [m, s] => {
            let m = m.trim().parse::<i64>().ok()?;
            let s = s.trim().parse::<i64>().ok()?;
            m.checked_mul(60)?.checked_add(s)?
        }
        _ => return None,
    };
    Some(secs.clamp(0, MAX_CLOCK_SECS as i64) as u64)
}

/// Step the edited value by five minutes, clamped to the valid range.
pub fn adjust_by_wheel(secs: u64, up: bool) -> u64 {
    if up {
        (secs + WHEEL_STEP_SECS).min(MAX_CLOCK_SECS)
    } else {
        secs.saturating_sub(WHEEL_STEP_SECS)
    }
}

/// Countdowns are always `MM:SS` (minutes may exceed 59). A stopwatch
/// switches to `HH:MM:SS` once a full hour has elapsed.
pub fn format_clock(secs: u64, mode: ClockMode) -> String {
    let s = secs % 60;
    match mode {
        ClockMode::Stopwatch if secs >= 3600 => {
            let hours = secs / 3600;
            let minutes = (secs % 3600) / 60;
            format!("{hours:02}:{minutes:02}:{s:02}")
        }
        _ => format!("{:02}:{s:02}", secs / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_start_pause_resume() {
        let mut clock = SessionClock::countdown(10);
        assert_eq!(clock.state(), ClockState::Idle);

        assert!(clock.start().is_some());
        assert!(clock.is_running());
        clock.tick();
        clock.tick();

        assert!(clock.pause().is_some());
        assert_eq!(clock.state(), ClockState::Paused);
        assert_eq!(clock.remaining_secs(), 8);

        // Ticks while paused are ignored.
        assert!(clock.tick().is_none());
        assert_eq!(clock.remaining_secs(), 8);

        assert!(clock.start().is_some());
        assert!(clock.start().is_none(), "already running");
    }

    #[test]
    fn countdown_completes_and_stops() {
        let mut clock = SessionClock::countdown(3);
        clock.start();
        assert!(clock.tick().is_none());
        assert!(clock.tick().is_none());
        assert!(matches!(clock.tick(), Some(Event::ClockCompleted { .. })));
        assert_eq!(clock.state(), ClockState::Completed);
        assert!(clock.tick().is_none());

        // Starting again reloads the configured duration.
        clock.start();
        assert_eq!(clock.remaining_secs(), 3);
        assert!(clock.is_running());
    }

    #[test]
    fn zero_duration_completes_without_ticking() {
        let mut clock = SessionClock::countdown(0);
        assert!(matches!(clock.start(), Some(Event::ClockCompleted { .. })));
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed_secs(), 0);
    }

    #[test]
    fn reset_restores_duration_or_zero() {
        let mut countdown = SessionClock::countdown(60);
        countdown.start();
        countdown.tick();
        countdown.reset();
        assert_eq!(countdown.remaining_secs(), 60);
        assert_eq!(countdown.state(), ClockState::Idle);

        let mut stopwatch = SessionClock::stopwatch();
        stopwatch.start();
        stopwatch.tick();
        stopwatch.tick();
        assert_eq!(stopwatch.display_secs(), 2);
        stopwatch.reset();
        assert_eq!(stopwatch.display_secs(), 0);
    }

    #[test]
    fn edits_rejected_while_running() {
        let mut clock = SessionClock::countdown(60);
        clock.start();
        assert_eq!(clock.set_remaining(30), Err(ValidationError::ClockRunning));
        assert_eq!(clock.set_duration(30), Err(ValidationError::ClockRunning));

        clock.pause();
        clock.set_remaining(30).unwrap();
        assert_eq!(clock.remaining_secs(), 30);
        assert_eq!(clock.duration_secs(), 60);
    }

    #[test]
    fn duration_is_clamped() {
        let clock = SessionClock::countdown(10_000 * 60);
        assert_eq!(clock.duration_secs(), MAX_CLOCK_SECS);
    }

    #[test]
    fn parses_editor_input() {
        assert_eq!(parse_clock_input("25"), Some(1500));
        assert_eq!(parse_clock_input("12:30"), Some(750));
        assert_eq!(parse_clock_input(" 0:05 "), Some(5));
        assert_eq!(parse_clock_input("5000"), Some(MAX_CLOCK_SECS));
        assert_eq!(parse_clock_input("-3"), Some(0));
        assert_eq!(parse_clock_input("abc"), None);
        assert_eq!(parse_clock_input("1:2:3"), None);
    }

    #[test]
    fn wheel_steps_five_minutes() {
        assert_eq!(adjust_by_wheel(600, true), 900);
        assert_eq!(adjust_by_wheel(120, false), 0);
        assert_eq!(adjust_by_wheel(MAX_CLOCK_SECS, true), MAX_CLOCK_SECS);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0, ClockMode::Countdown), "00:00");
        assert_eq!(format_clock(1500, ClockMode::Countdown), "25:00");
        assert_eq!(format_clock(5400, ClockMode::Countdown), "90:00");
        assert_eq!(format_clock(59, ClockMode::Stopwatch), "00:59");
        assert_eq!(format_clock(3725, ClockMode::Stopwatch), "01:02:05");
    }
}
