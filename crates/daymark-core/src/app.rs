//! Application state container.
//!
//! `AppState` owns every list, the view controller and the storage backend.
//! Each mutation is applied to a copy, written through to storage, and only
//! then swapped in, so a failed write leaves memory and disk in agreement.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::assistant::{RequestGate, RequestTicket, ScheduleAssistant};
use crate::checkin::{default_themes, CheckinRecord, CheckinTheme, CheckinTracker};
use crate::confirm::Confirmation;
use crate::error::{AssistantError, Result, ValidationError};
use crate::events::Event;
use crate::schedule::{CompletionShadow, ItemDraft, ScheduleFilter, ScheduleItem, ScheduleItemData, ScheduleStore};
use crate::stats::{Milestones, SessionLog, TodaySummary};
use crate::storage::persist::{encode, load_or_seed, save};
use crate::storage::{keys, Config, KvStore};
use crate::tags::TagList;
use crate::timer::{ActiveTimer, TimerOutcome};
use crate::view::{Gate, ViewChange, ViewController, ViewRequest};

/// A destructive action waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteItem(String),
    DeleteTheme(String),
    ToggleCheckin { theme_id: String, date: NaiveDate },
}

/// What a confirmation actually did.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    View { change: ViewChange, events: Vec<Event> },
    ItemDeleted(String),
    ThemeDeleted(CheckinTheme),
    CheckinToggled { theme_id: String, date: NaiveDate, checked: bool },
}

pub struct AppState<S: KvStore> {
    store: S,
    config: Config,
    schedule: ScheduleStore,
    sessions: SessionLog,
    checkin: CheckinTracker,
    tags: TagList,
    view: ViewController,
    shadows: HashMap<String, CompletionShadow>,
    pending: Option<PendingAction>,
    assistant: RequestGate,
    now: fn() -> DateTime<Utc>,
}

impl<S: KvStore> AppState<S> {
    /// Load every list from `store`, seeding whatever is missing or corrupt.
    pub fn load(store: S, config: Config) -> Self {
        Self::load_with_clock(store, config, Utc::now)
    }

    /// As [`AppState::load`], with an injected wall clock.
    pub fn load_with_clock(store: S, config: Config, now: fn() -> DateTime<Utc>) -> Self {
        let today = now().with_timezone(&Local).date_naive();
        let schedule = load_or_seed(&store, keys::SCHEDULE_ITEMS, || ScheduleStore::seed(today));
        let sessions = load_or_seed(&store, keys::FOCUS_SESSIONS, SessionLog::new);
        let themes: Vec<CheckinTheme> = load_or_seed(&store, keys::CHECKIN_THEMES, default_themes);
        let records = load_or_seed(&store, keys::CHECKIN_DATA, CheckinRecord::default);
        let tags = load_or_seed(&store, keys::FOCUS_TAGS, TagList::default);
        let view = ViewController::new(config.default_focus_secs());

        info!(
            items = schedule.items().len(),
            sessions = sessions.len(),
            themes = themes.len(),
            "state loaded"
        );

        Self {
            store,
            config,
            schedule,
            sessions,
            checkin: CheckinTracker::new(themes, records),
            tags,
            view,
            shadows: HashMap::new(),
            pending: None,
            assistant: RequestGate::new(),
            now,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schedule(&self) -> &ScheduleStore {
        &self.schedule
    }

    pub fn sessions(&self) -> &SessionLog {
        &self.sessions
    }

    pub fn checkin(&self) -> &CheckinTracker {
        &self.checkin
    }

    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    /// Today's local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }

    // ── Confirmation ────────────────────────────────────────────────

    /// Apply whatever is waiting for confirmation.
    ///
    /// # Errors
    /// The action became invalid or could not be persisted.
    pub fn confirm(&mut self) -> Result<Option<Confirmed>> {
        if let Some(change) = self.view.confirm() {
            let events = change.events(self.now());
            return Ok(Some(Confirmed::View { change, events }));
        }

        let Some(action) = self.pending.take() else {
            return Ok(None);
        };
        let confirmed = match action {
            PendingAction::DeleteItem(id) => {
                self.delete_item(&id)?;
                Confirmed::ItemDeleted(id)
            }
            PendingAction::DeleteTheme(id) => Confirmed::ThemeDeleted(self.delete_theme(&id)?),
            PendingAction::ToggleCheckin { theme_id, date } => {
                let checked = self.toggle_checkin(&theme_id, date)?;
                Confirmed::CheckinToggled {
                    theme_id,
                    date,
                    checked,
                }
            }
        };
        Ok(Some(confirmed))
    }

    /// Drop whatever is waiting. Nothing else changes.
    pub fn decline(&mut self) -> bool {
        let view = self.view.decline();
        let action = self.pending.take().is_some();
        view || action
    }

    fn park(&mut self, action: PendingAction) {
        self.view.decline();
        self.pending = Some(action);
    }

    // ── Views and timers ────────────────────────────────────────────

    /// Single entry point for view transitions.
    pub fn request_view(&mut self, request: ViewRequest) -> Gate {
        self.pending = None;
        self.view.request(request)
    }

    fn timer_mut(&mut self) -> Result<&mut ActiveTimer, ValidationError> {
        self.view.timer_mut().ok_or(ValidationError::NoActiveTimer)
    }

    /// Append a committed session before handing the events back.
    fn absorb(&mut self, outcome: TimerOutcome) -> Result<Vec<Event>> {
        if let Some(session) = outcome.committed {
            let mut next = self.sessions.clone();
            info!(duration = session.duration, tag = ?session.tag, "focus session committed");
            next.append(session);
            save(&self.store, keys::FOCUS_SESSIONS, &next)?;
            self.sessions = next;
        }
        Ok(outcome.events)
    }

    /// # Errors
    /// No timer view is active, or the committed session cannot be saved.
    pub fn start_timer(&mut self) -> Result<Vec<Event>> {
        let now = self.now();
        let outcome = self.timer_mut()?.start(now);
        self.absorb(outcome)
    }

    /// # Errors
    /// See [`AppState::start_timer`].
    pub fn pause_timer(&mut self) -> Result<Vec<Event>> {
        let now = self.now();
        let outcome = self.timer_mut()?.pause(now);
        self.absorb(outcome)
    }

    /// Stopwatch "finish" and focus timer "reset": commit, then reset.
    ///
    /// # Errors
    /// See [`AppState::start_timer`].
    pub fn finish_timer(&mut self) -> Result<Vec<Event>> {
        let now = self.now();
        let outcome = self.timer_mut()?.finish(now);
        self.absorb(outcome)
    }

    /// # Errors
    /// See [`AppState::start_timer`].
    pub fn tick_timer(&mut self) -> Result<Vec<Event>> {
        let now = self.now();
        let outcome = self.timer_mut()?.tick(now);
        self.absorb(outcome)
    }

    /// # Errors
    /// No timer, or the clock is running.
    pub fn set_timer_duration(&mut self, secs: u64) -> Result<()> {
        let secs = secs.min(self.config.max_focus_secs());
        self.timer_mut()?.set_duration(secs)?;
        Ok(())
    }

    /// # Errors
    /// No timer, or the clock is running.
    pub fn set_timer_remaining(&mut self, secs: u64) -> Result<()> {
        let secs = secs.min(self.config.max_focus_secs());
        self.timer_mut()?.set_remaining(secs)?;
        Ok(())
    }

    /// # Errors
    /// No timer, or the tag is not in the tag list.
    pub fn select_tag(&mut self, tag: Option<&str>) -> Result<()> {
        if let Some(tag) = tag {
            if !self.tags.contains(tag) {
                return Err(ValidationError::NotFound {
                    kind: "tag",
                    id: tag.to_string(),
                }
                .into());
            }
        }
        self.timer_mut()?.select_tag(tag.map(str::to_string));
        Ok(())
    }

    // ── Schedule ────────────────────────────────────────────────────

    fn commit_schedule(&mut self, next: ScheduleStore) -> Result<()> {
        save(&self.store, keys::SCHEDULE_ITEMS, &next)?;
        self.schedule = next;
        Ok(())
    }

    pub fn project(&self, filter: ScheduleFilter) -> Vec<&ScheduleItem> {
        self.schedule.project(filter, self.today())
    }

    /// Insert already-validated items (manual entry or the assistant).
    ///
    /// # Errors
    /// Storage failure; nothing is added.
    pub fn add_items(&mut self, batch: Vec<ScheduleItemData>) -> Result<Vec<String>> {
        let mut next = self.schedule.clone();
        let ids = next.add(batch);
        self.commit_schedule(next)?;
        debug!(count = ids.len(), "items added");
        Ok(ids)
    }

    /// # Errors
    /// Validation or storage failure.
    pub fn add_draft(&mut self, draft: &ItemDraft) -> Result<String> {
        let data = draft.validate()?;
        let mut ids = self.add_items(vec![data])?;
        ids.pop().ok_or_else(|| {
            ValidationError::NotFound {
                kind: "item",
                id: String::new(),
            }
            .into()
        })
    }

    /// Replace an item's data. Unknown ids are a no-op returning false.
    ///
    /// # Errors
    /// Validation or storage failure.
    pub fn update_item(&mut self, id: &str, draft: &ItemDraft) -> Result<bool> {
        let data = draft.validate()?;
        let mut next = self.schedule.clone();
        if !next.update(id, data) {
            return Ok(false);
        }
        self.commit_schedule(next)?;
        Ok(true)
    }

    /// # Errors
    /// Storage failure.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Option<bool>> {
        let mut next = self.schedule.clone();
        let Some(completed) = next.toggle_complete(id) else {
            return Ok(None);
        };
        self.commit_schedule(next)?;
        Ok(Some(completed))
    }

    /// # Errors
    /// Unknown item.
    pub fn request_delete_item(&mut self, id: &str) -> Result<Confirmation> {
        let item = self.schedule.get(id).ok_or_else(|| ValidationError::NotFound {
            kind: "item",
            id: id.to_string(),
        })?;
        let prompt = Confirmation::danger(
            "Delete Item?",
            format!("Are you sure you want to delete \"{}\"? This cannot be undone.", item.title),
        );
        self.park(PendingAction::DeleteItem(id.to_string()));
        Ok(prompt)
    }

    /// # Errors
    /// Storage failure.
    pub fn delete_item(&mut self, id: &str) -> Result<bool> {
        let mut next = self.schedule.clone();
        if !next.delete(id) {
            return Ok(false);
        }
        self.commit_schedule(next)?;
        self.shadows.remove(id);
        Ok(true)
    }

    /// Completion as currently shown, including a pending optimistic flip.
    pub fn shown_completed(&self, id: &str) -> Option<bool> {
        let stored = self.schedule.get(id)?.completed;
        Some(self.shadows.get(id).map_or(stored, CompletionShadow::is_completed))
    }

    /// Flip an item's completion on screen now; the store follows in
    /// [`AppState::settle_completions`]. Ignored while a flip is pending.
    pub fn press_complete(&mut self, id: &str, now: Instant) -> bool {
        let Some(item) = self.schedule.get(id) else {
            return false;
        };
        let stored = item.completed;
        let delay = self.config.completion_delay();
        self.shadows
            .entry(id.to_string())
            .or_insert_with(|| CompletionShadow::new(stored))
            .press(now, delay)
    }

    /// Commit every shadow whose delay has elapsed. Returns the toggled ids.
    ///
    /// # Errors
    /// Storage failure; remaining shadows stay pending.
    pub fn settle_completions(&mut self, now: Instant) -> Result<Vec<String>> {
        let due: Vec<String> = self
            .shadows
            .iter()
            .filter(|(_, shadow)| shadow.is_due(now))
            .map(|(id, _)| id.clone())
            .collect();

        let mut settled = Vec::with_capacity(due.len());
        for id in due {
            if let Some(stored) = self.toggle_complete(&id)? {
                debug!(%id, completed = stored, "completion settled");
                settled.push(id.clone());
            }
            self.shadows.remove(&id);
        }
        Ok(settled)
    }

    pub fn has_pending_completions(&self) -> bool {
        self.shadows.values().any(CompletionShadow::is_pending)
    }

    // ── Stats ───────────────────────────────────────────────────────

    pub fn today_summary(&self) -> TodaySummary {
        self.sessions.today_summary(self.today())
    }

    pub fn milestones(&self) -> Milestones {
        self.sessions.milestones()
    }

    /// Delete one session. No confirmation.
    ///
    /// # Errors
    /// Storage failure.
    pub fn delete_session(&mut self, id: &str) -> Result<bool> {
        let mut next = self.sessions.clone();
        if !next.delete(id) {
            return Ok(false);
        }
        save(&self.store, keys::FOCUS_SESSIONS, &next)?;
        self.sessions = next;
        Ok(true)
    }

    // ── Check-ins ───────────────────────────────────────────────────

    fn commit_checkin(&mut self, next: CheckinTracker, themes: bool, records: bool) -> Result<()> {
        let mut batch = Vec::with_capacity(2);
        if themes {
            batch.push((keys::CHECKIN_THEMES, encode(keys::CHECKIN_THEMES, next.themes())?));
        }
        if records {
            batch.push((keys::CHECKIN_DATA, encode(keys::CHECKIN_DATA, next.records())?));
        }
        self.store.set_many(&batch)?;
        self.checkin = next;
        Ok(())
    }

    /// # Errors
    /// Unknown theme or a future date.
    pub fn request_checkin_toggle(&mut self, theme_id: &str, date: NaiveDate) -> Result<Confirmation> {
        if date > self.today() {
            return Err(ValidationError::FutureDate(date).into());
        }
        let prompt = self.checkin.toggle_prompt(theme_id, date)?;
        self.park(PendingAction::ToggleCheckin {
            theme_id: theme_id.to_string(),
            date,
        });
        Ok(prompt)
    }

    /// # Errors
    /// Unknown theme, future date, or storage failure.
    pub fn toggle_checkin(&mut self, theme_id: &str, date: NaiveDate) -> Result<bool> {
        let mut next = self.checkin.clone();
        let checked = next.toggle(theme_id, date, self.today())?;
        self.commit_checkin(next, false, true)?;
        Ok(checked)
    }

    pub fn streak(&self, theme_id: &str) -> u32 {
        self.checkin.calculate_streak(theme_id, self.today())
    }

    /// # Errors
    /// Invalid name or storage failure.
    pub fn add_theme(&mut self, name: &str) -> Result<CheckinTheme> {
        let mut next = self.checkin.clone();
        let theme = next
            .add_theme(name, self.config.checkin.max_theme_name_len)?
            .clone();
        self.commit_checkin(next, true, false)?;
        Ok(theme)
    }

    /// The last theme gets an acknowledge-only warning and nothing is parked.
    ///
    /// # Errors
    /// Unknown theme.
    pub fn request_delete_theme(&mut self, id: &str) -> Result<Confirmation> {
        match self.checkin.delete_prompt(id) {
            Ok(prompt) => {
                self.park(PendingAction::DeleteTheme(id.to_string()));
                Ok(prompt)
            }
            Err(ValidationError::LastTheme) => Ok(Confirmation::warning(
                "Cannot Delete Theme",
                ValidationError::LastTheme.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Themes and records are written in one batch.
    ///
    /// # Errors
    /// Last theme, unknown theme, or storage failure.
    pub fn delete_theme(&mut self, id: &str) -> Result<CheckinTheme> {
        let mut next = self.checkin.clone();
        let removed = next.delete_theme(id)?;
        self.commit_checkin(next, true, true)?;
        info!(theme = %removed.name, "check-in theme deleted");
        Ok(removed)
    }

    /// # Errors
    /// Not a permutation, or storage failure.
    pub fn reorder_themes(&mut self, order: &[String]) -> Result<()> {
        let mut next = self.checkin.clone();
        next.reorder_themes(order)?;
        self.commit_checkin(next, true, false)
    }

    /// # Errors
    /// Unknown theme.
    pub fn select_theme(&mut self, id: &str) -> Result<()> {
        self.checkin.select_theme(id)?;
        Ok(())
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// Add a tag and select it on the active timer, if any.
    ///
    /// # Errors
    /// Storage failure.
    pub fn add_tag(&mut self, tag: &str) -> Result<Option<String>> {
        let mut next = self.tags.clone();
        let Some(added) = next.add(tag) else {
            return Ok(None);
        };
        save(&self.store, keys::FOCUS_TAGS, &next)?;
        self.tags = next;
        if let Some(timer) = self.view.timer_mut() {
            timer.select_tag(Some(added.clone()));
        }
        Ok(Some(added))
    }

    /// Delete a tag, clearing it from the active timer if selected there.
    ///
    /// # Errors
    /// Storage failure.
    pub fn delete_tag(&mut self, tag: &str) -> Result<bool> {
        let mut next = self.tags.clone();
        if !next.delete(tag) {
            return Ok(false);
        }
        save(&self.store, keys::FOCUS_TAGS, &next)?;
        self.tags = next;
        if let Some(timer) = self.view.timer_mut() {
            if timer.tag() == Some(tag) {
                timer.select_tag(None);
            }
        }
        Ok(true)
    }

    /// # Errors
    /// Not a permutation, or storage failure.
    pub fn reorder_tags(&mut self, order: &[String]) -> Result<()> {
        let mut next = self.tags.clone();
        next.reorder(order)?;
        save(&self.store, keys::FOCUS_TAGS, &next)?;
        self.tags = next;
        Ok(())
    }

    // ── Assistant ───────────────────────────────────────────────────

    /// # Errors
    /// Storage failure.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            self.store.delete(keys::ASSISTANT_API_KEY)?;
        } else {
            self.store.set(keys::ASSISTANT_API_KEY, key)?;
        }
        Ok(())
    }

    pub fn begin_assistant_request(&mut self) -> RequestTicket {
        self.assistant.issue()
    }

    /// The assistant modal was closed; late replies are ignored.
    pub fn cancel_assistant_request(&mut self) {
        self.assistant.cancel();
    }

    /// Proposed items for a still-current `ticket`. Nothing is inserted
    /// until the user picks from them with [`AppState::accept_suggestions`].
    /// A stale reply is dropped and yields `Ok(None)`.
    ///
    /// # Errors
    /// The assistant failed.
    pub fn finish_parse(
        &mut self,
        ticket: RequestTicket,
        reply: std::result::Result<Vec<ScheduleItemData>, AssistantError>,
    ) -> Result<Option<Vec<ScheduleItemData>>> {
        if !self.assistant.accept(ticket) {
            debug!(?ticket, "dropping stale assistant reply");
            return Ok(None);
        }
        Ok(Some(reply?))
    }

    /// Insert the proposals at `selected` (indices into `proposals`), in
    /// proposal order. An empty selection inserts nothing.
    ///
    /// # Errors
    /// An index past the end of `proposals`, or storage failure.
    pub fn accept_suggestions(
        &mut self,
        proposals: Vec<ScheduleItemData>,
        selected: &[usize],
    ) -> Result<Vec<String>> {
        if let Some(&bad) = selected.iter().find(|&&i| i >= proposals.len()) {
            return Err(ValidationError::NotFound {
                kind: "suggestion",
                id: (bad + 1).to_string(),
            }
            .into());
        }
        let chosen: Vec<ScheduleItemData> = proposals
            .into_iter()
            .enumerate()
            .filter(|(i, _)| selected.contains(i))
            .map(|(_, data)| data)
            .collect();
        if chosen.is_empty() {
            return Ok(Vec::new());
        }
        self.add_items(chosen)
    }

    /// # Errors
    /// The assistant failed.
    pub fn finish_answer(
        &mut self,
        ticket: RequestTicket,
        reply: std::result::Result<String, AssistantError>,
    ) -> Result<Option<String>> {
        if !self.assistant.accept(ticket) {
            debug!(?ticket, "dropping stale assistant reply");
            return Ok(None);
        }
        Ok(Some(reply?))
    }

    /// Parse `prompt` into proposed items for review.
    ///
    /// # Errors
    /// See [`AppState::finish_parse`].
    pub async fn suggest_items<A>(
        &mut self,
        assistant: &A,
        prompt: &str,
    ) -> Result<Option<Vec<ScheduleItemData>>>
    where
        A: ScheduleAssistant + ?Sized,
    {
        let ticket = self.begin_assistant_request();
        let snapshot = self.schedule.items().to_vec();
        let reply = assistant.parse_schedule_from_text(prompt, &snapshot).await;
        self.finish_parse(ticket, reply)
    }

    /// # Errors
    /// See [`AppState::finish_answer`].
    pub async fn ask_assistant<A>(&mut self, assistant: &A, prompt: &str) -> Result<Option<String>>
    where
        A: ScheduleAssistant + ?Sized,
    {
        let ticket = self.begin_assistant_request();
        let snapshot = self.schedule.items().to_vec();
        let reply = assistant.answer_schedule_question(prompt, &snapshot).await;
        self.finish_answer(ticket, reply)
    }
}
