//! View/mode controller.
//!
//! Owns the single active clock slot. The focus timer and the stopwatch are
//! never alive at the same time: every transition discards whatever clock was
//! there and builds a fresh one for the target view. A transition requested
//! while a clock is running is parked until the user confirms or declines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confirm::Confirmation;
use crate::events::Event;
use crate::schedule::{ScheduleFilter, ScheduleItem};
use crate::timer::ActiveTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "filter", rename_all = "snake_case")]
pub enum View {
    Schedule(ScheduleFilter),
    FocusTimer,
    Stopwatch,
    Stats,
    Checkin,
}

impl Default for View {
    fn default() -> Self {
        View::Schedule(ScheduleFilter::Today)
    }
}

impl View {
    pub fn is_schedule(&self) -> bool {
        matches!(self, View::Schedule(_))
    }
}

/// Non-schedule views reachable from the navigation bar. Selecting the one
/// already shown closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Focus,
    Stopwatch,
    Stats,
    Checkin,
}

impl Panel {
    fn view(self) -> View {
        match self {
            Panel::Focus => View::FocusTimer,
            Panel::Stopwatch => View::Stopwatch,
            Panel::Stats => View::Stats,
            Panel::Checkin => View::Checkin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewRequest {
    Filter(ScheduleFilter),
    Toggle(Panel),
    /// Open the focus timer preloaded with an item's length.
    FocusFor { duration_secs: u64 },
}

impl ViewRequest {
    /// "Focus this item": only for items with both a start and an end time.
    pub fn focus_item(item: &ScheduleItem) -> Option<Self> {
        item.focus_duration_secs()
            .map(|duration_secs| ViewRequest::FocusFor { duration_secs })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChange {
    pub from: View,
    pub to: View,
    /// Pending seconds thrown away with the previous clock.
    pub discarded_secs: u64,
}

impl ViewChange {
    pub fn events(&self, at: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::with_capacity(2);
        if self.discarded_secs > 0 {
            events.push(Event::ClockDiscarded {
                discarded_secs: self.discarded_secs,
                at,
            });
        }
        events.push(Event::ViewChanged {
            from: self.from,
            to: self.to,
            at,
        });
        events
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Applied(ViewChange),
    /// Nothing changed; call [`ViewController::confirm`] or
    /// [`ViewController::decline`].
    NeedsConfirmation(Confirmation),
}

#[derive(Debug)]
pub struct ViewController {
    current: View,
    timer: Option<ActiveTimer>,
    focus_override: Option<u64>,
    default_focus_secs: u64,
    pending: Option<ViewRequest>,
    edit_mode: bool,
}

impl ViewController {
    pub fn new(default_focus_secs: u64) -> Self {
        Self {
            current: View::default(),
            timer: None,
            focus_override: None,
            default_focus_secs,
            pending: None,
            edit_mode: false,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn timer(&self) -> Option<&ActiveTimer> {
        self.timer.as_ref()
    }

    pub fn timer_mut(&mut self) -> Option<&mut ActiveTimer> {
        self.timer.as_mut()
    }

    pub fn is_clock_running(&self) -> bool {
        self.timer.as_ref().is_some_and(ActiveTimer::is_running)
    }

    pub fn focus_override(&self) -> Option<u64> {
        self.focus_override
    }

    pub fn pending(&self) -> Option<ViewRequest> {
        self.pending
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Edit mode only exists on schedule views. Returns the resulting state.
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = self.current.is_schedule() && !self.edit_mode;
        self.edit_mode
    }

    pub fn set_default_focus_secs(&mut self, secs: u64) {
        self.default_focus_secs = secs;
    }

    fn target(&self, request: ViewRequest) -> View {
        match request {
            ViewRequest::Filter(filter) => View::Schedule(filter),
            ViewRequest::Toggle(panel) if self.current == panel.view() => View::default(),
            ViewRequest::Toggle(panel) => panel.view(),
            ViewRequest::FocusFor { .. } => View::FocusTimer,
        }
    }

    /// Single entry point for every view transition.
    pub fn request(&mut self, request: ViewRequest) -> Gate {
        if self.is_clock_running() {
            debug!(?request, "view change parked behind running clock");
            self.pending = Some(request);
            return Gate::NeedsConfirmation(Confirmation::running_timer());
        }
        Gate::Applied(self.apply(request))
    }

    /// Accept the parked transition.
    pub fn confirm(&mut self) -> Option<ViewChange> {
        let request = self.pending.take()?;
        Some(self.apply(request))
    }

    /// Drop the parked transition. The clock keeps running untouched.
    pub fn decline(&mut self) -> bool {
        self.pending.take().is_some()
    }

    fn apply(&mut self, request: ViewRequest) -> ViewChange {
        let from = self.current;
        let to = self.target(request);

        let discarded_secs = self
            .timer
            .take()
            .map(|mut timer| timer.discard())
            .unwrap_or(0);
        self.focus_override = match request {
            ViewRequest::FocusFor { duration_secs } if to == View::FocusTimer => Some(duration_secs),
            _ => None,
        };
        self.timer = match to {
            View::FocusTimer => Some(ActiveTimer::focus(
                self.focus_override.unwrap_or(self.default_focus_secs),
            )),
            View::Stopwatch => Some(ActiveTimer::stopwatch()),
            _ => None,
        };
        self.edit_mode = false;
        self.current = to;

        debug!(?from, ?to, discarded_secs, "view changed");
        ViewChange {
            from,
            to,
            discarded_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleItemData;
    use chrono::{NaiveDate, NaiveTime};

    fn running_focus(controller: &mut ViewController, ticks: u64) {
        controller.request(ViewRequest::Toggle(Panel::Focus));
        let timer = controller.timer_mut().unwrap();
        timer.start(Utc::now());
        for _ in 0..ticks {
            timer.tick(Utc::now());
        }
    }

    #[test]
    fn starts_on_todays_schedule() {
        let controller = ViewController::new(1500);
        assert_eq!(controller.current(), View::Schedule(ScheduleFilter::Today));
        assert!(controller.timer().is_none());
    }

    #[test]
    fn idle_transition_applies_immediately() {
        let mut controller = ViewController::new(1500);
        let gate = controller.request(ViewRequest::Toggle(Panel::Stopwatch));
        assert!(matches!(gate, Gate::Applied(ViewChange { to: View::Stopwatch, .. })));
        assert_eq!(controller.timer().unwrap().clock().display_secs(), 0);
    }

    #[test]
    fn toggling_active_panel_returns_to_today() {
        let mut controller = ViewController::new(1500);
        controller.request(ViewRequest::Toggle(Panel::Stats));
        controller.request(ViewRequest::Toggle(Panel::Stats));
        assert_eq!(controller.current(), View::default());
    }

    #[test]
    fn decline_keeps_clock_running() {
        let mut controller = ViewController::new(1500);
        running_focus(&mut controller, 12);

        let gate = controller.request(ViewRequest::Toggle(Panel::Stopwatch));
        assert_eq!(gate, Gate::NeedsConfirmation(Confirmation::running_timer()));
        assert!(controller.decline());

        assert_eq!(controller.current(), View::FocusTimer);
        assert!(controller.is_clock_running());
        assert_eq!(controller.timer().unwrap().pending_secs(), 12);
        assert!(controller.pending().is_none());
    }

    #[test]
    fn confirm_discards_and_switches() {
        let mut controller = ViewController::new(1500);
        running_focus(&mut controller, 30);

        controller.request(ViewRequest::Toggle(Panel::Stopwatch));
        let change = controller.confirm().unwrap();

        assert_eq!(change.from, View::FocusTimer);
        assert_eq!(change.to, View::Stopwatch);
        assert_eq!(change.discarded_secs, 30);
        let timer = controller.timer().unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.clock().display_secs(), 0);
        assert_eq!(timer.pending_secs(), 0);
    }

    #[test]
    fn filter_change_is_gated_too() {
        let mut controller = ViewController::new(1500);
        running_focus(&mut controller, 1);
        let gate = controller.request(ViewRequest::Filter(ScheduleFilter::All));
        assert!(matches!(gate, Gate::NeedsConfirmation(_)));
        assert_eq!(controller.current(), View::FocusTimer);
    }

    #[test]
    fn paused_clock_switches_without_prompt() {
        let mut controller = ViewController::new(1500);
        running_focus(&mut controller, 4);
        controller.timer_mut().unwrap().pause(Utc::now());
        assert!(matches!(
            controller.request(ViewRequest::Filter(ScheduleFilter::Completed)),
            Gate::Applied(_)
        ));
    }

    #[test]
    fn focus_item_sets_override_until_next_change() {
        let data = ScheduleItemData {
            title: "Deep work".into(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(9, 40, 0),
            category: None,
        };
        let item = ScheduleItem::from_data("a".into(), data);
        let mut controller = ViewController::new(1500);

        controller.request(ViewRequest::focus_item(&item).unwrap());
        assert_eq!(controller.focus_override(), Some(2400));
        assert_eq!(controller.timer().unwrap().clock().duration_secs(), 2400);

        controller.request(ViewRequest::Toggle(Panel::Focus));
        controller.request(ViewRequest::Toggle(Panel::Focus));
        assert_eq!(controller.focus_override(), None);
        assert_eq!(controller.timer().unwrap().clock().duration_secs(), 1500);
    }

    #[test]
    fn edit_mode_cleared_by_view_change() {
        let mut controller = ViewController::new(1500);
        assert!(controller.toggle_edit_mode());
        controller.request(ViewRequest::Filter(ScheduleFilter::All));
        assert!(!controller.edit_mode());

        controller.request(ViewRequest::Toggle(Panel::Stats));
        assert!(!controller.toggle_edit_mode());
    }
}
