//! # Daymark Core Library
//!
//! State and rules for a personal scheduler with focus tracking. The CLI
//! binary is a thin surface over this library; everything it shows is a
//! projection of [`AppState`].
//!
//! ## Architecture
//!
//! - **Session Clock**: a one-second state machine; the caller drives
//!   `tick()` from an owned [`Ticker`]
//! - **View Controller**: the only place a clock is created or discarded,
//!   with confirmation before throwing away a running one
//! - **Storage**: a key-value seam ([`KvStore`]) with SQLite and in-memory
//!   backends, plus TOML configuration
//! - **Assistant**: natural-language scheduling over an HTTP model API
//!
//! ## Key Components
//!
//! - [`AppState`]: owns every list and writes each change through
//! - [`ActiveTimer`]: a clock with its session accountant
//! - [`CheckinTracker`]: habit check-ins, streaks and calendars
//! - [`SessionLog`]: focus history and its statistics

pub mod app;
pub mod assistant;
pub mod checkin;
pub mod confirm;
pub mod error;
pub mod events;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod tags;
pub mod timer;
pub mod view;

pub use app::{AppState, Confirmed, PendingAction};
pub use assistant::{GeminiAssistant, RequestGate, RequestTicket, ScheduleAssistant};
pub use checkin::{CalendarCell, CalendarMonth, CheckinRecord, CheckinTheme, CheckinTracker, DayState};
pub use confirm::{ConfirmKind, Confirmation};
pub use error::{AssistantError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use schedule::{Category, ItemDraft, ScheduleFilter, ScheduleItem, ScheduleItemData, ScheduleStore};
pub use stats::{FocusSession, SessionLog, TagTotal, TodaySummary};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore};
pub use tags::TagList;
pub use timer::{ActiveTimer, ClockMode, ClockState, SessionClock, Ticker, TimerOutcome};
pub use view::{Gate, Panel, View, ViewChange, ViewController, ViewRequest};
