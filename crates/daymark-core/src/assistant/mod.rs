//! AI scheduling assistant.
//!
//! The assistant is an external collaborator: [`ScheduleAssistant`] is the
//! seam, [`GeminiAssistant`] the HTTP implementation. Replies may arrive after
//! the user has moved on, so every request carries a [`RequestTicket`] and
//! only the newest outstanding ticket is accepted.

mod gemini;
pub mod postprocess;

pub use gemini::GeminiAssistant;

use async_trait::async_trait;

use crate::error::AssistantError;
use crate::schedule::{ScheduleItem, ScheduleItemData};

#[async_trait]
pub trait ScheduleAssistant: Send + Sync {
    /// Natural language to one or more new items. `schedule` is context
    /// for placing them.
    async fn parse_schedule_from_text(
        &self,
        prompt: &str,
        schedule: &[ScheduleItem],
    ) -> Result<Vec<ScheduleItemData>, AssistantError>;

    /// Plain-text answer about the current schedule.
    async fn answer_schedule_question(
        &self,
        prompt: &str,
        schedule: &[ScheduleItem],
    ) -> Result<String, AssistantError>;
}

/// Identifies one outstanding assistant request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Generation counter for assistant requests.
#[derive(Debug, Default)]
pub struct RequestGate {
    generation: u64,
    outstanding: Option<u64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any earlier ticket becomes stale.
    pub fn issue(&mut self) -> RequestTicket {
        self.generation += 1;
        self.outstanding = Some(self.generation);
        RequestTicket(self.generation)
    }

    /// The modal was dismissed; whatever is in flight is stale.
    pub fn cancel(&mut self) {
        self.outstanding = None;
    }

    pub fn is_waiting(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Claim a response. True exactly once, for the newest ticket.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if self.outstanding == Some(ticket.0) {
            self.outstanding = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_makes_older_stale() {
        let mut gate = RequestGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.accept(first));
        assert!(gate.accept(second));
        assert!(!gate.accept(second));
    }

    #[test]
    fn cancel_drops_in_flight_reply() {
        let mut gate = RequestGate::new();
        let ticket = gate.issue();
        gate.cancel();
        assert!(!gate.is_waiting());
        assert!(!gate.accept(ticket));
    }
}
