//! A clock paired with its session accountant and selected tag.
//!
//! This is what the focus timer and stopwatch views actually drive. Every
//! commit point (pause, finish, natural completion) hands back the committed
//! [`FocusSession`] so the caller can append it to the log before anything
//! else happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::accountant::SessionAccountant;
use super::clock::{ClockMode, SessionClock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::stats::FocusSession;

/// Result of one timer command.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimerOutcome {
    pub events: Vec<Event>,
    pub committed: Option<FocusSession>,
}

impl TimerOutcome {
    fn push(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.events.push(event);
        }
    }

    fn commit(&mut self, session: Option<FocusSession>) {
        if let Some(session) = session {
            self.events.push(Event::SessionCommitted {
                session: session.clone(),
            });
            self.committed = Some(session);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTimer {
    clock: SessionClock,
    accountant: SessionAccountant,
    tag: Option<String>,
}

impl ActiveTimer {
    /// A focus countdown of `duration_secs`.
    pub fn focus(duration_secs: u64) -> Self {
        Self {
            clock: SessionClock::countdown(duration_secs),
            accountant: SessionAccountant::new(),
            tag: None,
        }
    }

    pub fn stopwatch() -> Self {
        Self {
            clock: SessionClock::stopwatch(),
            accountant: SessionAccountant::new(),
            tag: None,
        }
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn mode(&self) -> ClockMode {
        self.clock.mode()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn pending_secs(&self) -> u64 {
        self.accountant.pending_secs()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The tag attached to sessions committed from now on.
    pub fn select_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> TimerOutcome {
        let mut out = TimerOutcome::default();
        if self.clock.is_running() {
            return out;
        }
        self.accountant.begin();
        out.push(self.clock.start());
        if !self.clock.is_running() {
            // Zero-length countdown: completed on the spot with nothing accrued.
            out.commit(self.accountant.commit(self.tag.as_deref(), now));
        }
        out
    }

    /// Pause and commit the interval that just ended.
    pub fn pause(&mut self, now: DateTime<Utc>) -> TimerOutcome {
        let mut out = TimerOutcome::default();
        let Some(event) = self.clock.pause() else {
            return out;
        };
        out.events.push(event);
        out.commit(self.accountant.commit(self.tag.as_deref(), now));
        out
    }

    /// Commit whatever is pending and return the clock to its starting point.
    /// This is both the stopwatch's "finish" and the focus timer's "reset".
    pub fn finish(&mut self, now: DateTime<Utc>) -> TimerOutcome {
        let mut out = TimerOutcome::default();
        let session = self.accountant.commit(self.tag.as_deref(), now);
        out.events.push(self.clock.reset());
        out.commit(session);
        out
    }

    /// One elapsed second. Commits on natural countdown completion.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerOutcome {
        let mut out = TimerOutcome::default();
        if !self.clock.is_running() {
            return out;
        }
        self.accountant.record_tick();
        if let Some(event) = self.clock.tick() {
            out.events.push(event);
            out.commit(self.accountant.commit(self.tag.as_deref(), now));
        }
        out
    }

    /// Stop and throw away the running interval. Nothing is logged.
    pub fn discard(&mut self) -> u64 {
        self.clock.reset();
        self.accountant.discard()
    }

    /// # Errors
    /// Rejected while running.
    pub fn set_duration(&mut self, secs: u64) -> Result<(), ValidationError> {
        self.clock.set_duration(secs)?;
        self.accountant.discard();
        Ok(())
    }

    /// # Errors
    /// Rejected while running.
    pub fn set_remaining(&mut self, secs: u64) -> Result<(), ValidationError> {
        self.clock.set_remaining(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut ActiveTimer, secs: u64) -> Vec<FocusSession> {
        (0..secs)
            .filter_map(|_| timer.tick(Utc::now()).committed)
            .collect()
    }

    #[test]
    fn pause_resume_produces_separate_sessions() {
        let mut timer = ActiveTimer::focus(25 * 60);
        timer.select_tag(Some("Work".into()));

        timer.start(Utc::now());
        assert!(run(&mut timer, 15).is_empty());
        let first = timer.pause(Utc::now()).committed.unwrap();

        timer.start(Utc::now());
        run(&mut timer, 10);
        let second = timer.pause(Utc::now()).committed.unwrap();

        assert_eq!(first.duration, 15);
        assert_eq!(second.duration, 10);
        assert_eq!(second.tag.as_deref(), Some("Work"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn natural_completion_commits_once() {
        let mut timer = ActiveTimer::focus(5);
        timer.start(Utc::now());
        let sessions = run(&mut timer, 5);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration, 5);
        assert!(!timer.is_running());

        // Further ticks do nothing until an explicit start.
        assert!(run(&mut timer, 3).is_empty());
        assert!(timer.start(Utc::now()).events.len() == 1);
        assert!(timer.is_running());
        assert_eq!(timer.clock().remaining_secs(), 5);
    }

    #[test]
    fn pause_with_nothing_accrued_logs_nothing() {
        let mut timer = ActiveTimer::stopwatch();
        timer.start(Utc::now());
        let out = timer.pause(Utc::now());
        assert!(out.committed.is_none());
        assert_eq!(out.events.len(), 1);
    }

    #[test]
    fn stopwatch_finish_commits_and_zeroes() {
        let mut timer = ActiveTimer::stopwatch();
        timer.start(Utc::now());
        run(&mut timer, 42);
        let out = timer.finish(Utc::now());
        assert_eq!(out.committed.unwrap().duration, 42);
        assert_eq!(timer.clock().display_secs(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn finish_after_pause_does_not_double_count() {
        let mut timer = ActiveTimer::stopwatch();
        timer.start(Utc::now());
        run(&mut timer, 7);
        assert!(timer.pause(Utc::now()).committed.is_some());
        assert!(timer.finish(Utc::now()).committed.is_none());
    }

    #[test]
    fn discard_drops_pending_time() {
        let mut timer = ActiveTimer::focus(60);
        timer.start(Utc::now());
        run(&mut timer, 9);
        assert_eq!(timer.discard(), 9);
        assert!(!timer.is_running());
        assert_eq!(timer.pending_secs(), 0);
    }

    #[test]
    fn zero_length_focus_never_logs() {
        let mut timer = ActiveTimer::focus(0);
        let out = timer.start(Utc::now());
        assert!(out.committed.is_none());
        assert!(!timer.is_running());
    }
}
