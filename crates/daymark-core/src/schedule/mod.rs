//! Schedule items: timed or all-day entries with completion state.
//!
//! - [`ScheduleStore`]: the ordered collection and its filter/sort projection
//! - [`ItemDraft`]: raw form input and the validation rules applied at entry
//! - [`CompletionShadow`]: the short-lived visual state ahead of a toggle

mod item;
mod shadow;
mod store;
mod validation;

pub use item::{Category, ScheduleItem, ScheduleItemData};
pub use shadow::{CompletionShadow, COMPLETION_DELAY};
pub use store::{compare_for_display, ScheduleFilter, ScheduleStore};
pub use validation::{parse_date, ItemDraft, END_TIME_CLEARED_NOTICE, MAX_YEAR};

pub(crate) use item::hhmm;
