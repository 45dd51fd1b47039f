//! Daily check-ins for user-defined habits ("themes").
//!
//! Records are sparse: only toggled days are stored. Streaks and the month
//! calendar are projections over that record.

mod calendar;
mod tracker;

pub use calendar::{CalendarCell, CalendarMonth, DayState};
pub use tracker::{
    default_themes, CheckinRecord, CheckinTheme, CheckinTracker, MAX_THEME_NAME_LEN,
};
