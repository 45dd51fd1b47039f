//! Month grid projection for the check-in view.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    /// After today; shown disabled and not togglable.
    Future,
    Checked,
    Unchecked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarCell {
    /// Padding before the first day so columns line up with weekdays.
    Blank,
    Day { date: NaiveDate, state: DayState },
}

impl CalendarCell {
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            CalendarCell::Day {
                state: DayState::Checked | DayState::Unchecked,
                ..
            }
        )
    }
}

/// One month, weeks starting on Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub first: NaiveDate,
    pub cells: Vec<CalendarCell>,
}

impl CalendarMonth {
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] for an impossible year/month.
    pub fn build(
        year: i32,
        month: u32,
        today: NaiveDate,
        is_checked: impl Fn(NaiveDate) -> bool,
    ) -> Result<Self, ValidationError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ValidationError::InvalidDate(format!("{year:04}-{month:02}")))?;
        let leading = first.weekday().num_days_from_sunday() as usize;

        let mut cells = vec![CalendarCell::Blank; leading];
        cells.extend(first.iter_days().take_while(|d| d.month() == month).map(|date| {
            let state = if date > today {
                DayState::Future
            } else if is_checked(date) {
                DayState::Checked
            } else {
                DayState::Unchecked
            };
            CalendarCell::Day { date, state }
        }));

        Ok(Self { first, cells })
    }

    pub fn days_in_month(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, CalendarCell::Day { .. }))
            .count()
    }

    /// Rows of seven; the last row may be shorter.
    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell> {
        self.cells.chunks(7)
    }

    /// "March 2025"
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn previous(&self) -> Option<NaiveDate> {
        self.first.checked_sub_months(Months::new(1))
    }

    pub fn next(&self) -> Option<NaiveDate> {
        self.first.checked_add_months(Months::new(1))
    }
}
