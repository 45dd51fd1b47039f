use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::CalendarMonth;
use crate::confirm::Confirmation;
use crate::error::ValidationError;
use crate::tags::is_permutation;

pub const MAX_THEME_NAME_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinTheme {
    pub id: String,
    pub name: String,
}

/// theme id -> date -> checked. A missing date means not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckinRecord {
    by_theme: BTreeMap<String, BTreeMap<NaiveDate, bool>>,
}

impl CheckinRecord {
    pub fn is_checked(&self, theme_id: &str, date: NaiveDate) -> bool {
        self.by_theme
            .get(theme_id)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(false)
    }

    pub fn has_theme(&self, theme_id: &str) -> bool {
        self.by_theme.contains_key(theme_id)
    }

    fn toggle(&mut self, theme_id: &str, date: NaiveDate) -> bool {
        let slot = self
            .by_theme
            .entry(theme_id.to_string())
            .or_default()
            .entry(date)
            .or_insert(false);
        *slot = !*slot;
        *slot
    }

    fn remove_theme(&mut self, theme_id: &str) {
        self.by_theme.remove(theme_id);
    }
}

pub fn default_themes() -> Vec<CheckinTheme> {
    [("workout", "Workout"), ("study", "Study"), ("read", "Reading")]
        .into_iter()
        .map(|(id, name)| CheckinTheme {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Themes, their day records and the theme currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinTracker {
    themes: Vec<CheckinTheme>,
    records: CheckinRecord,
    selected: String,
}

impl Default for CheckinTracker {
    fn default() -> Self {
        Self::new(default_themes(), CheckinRecord::default())
    }
}

impl CheckinTracker {
    /// An empty theme list is replaced by the defaults so at least one theme exists.
    pub fn new(themes: Vec<CheckinTheme>, records: CheckinRecord) -> Self {
        let themes = if themes.is_empty() {
            default_themes()
        } else {
            themes
        };
        let selected = themes[0].id.clone();
        Self {
            themes,
            records,
            selected,
        }
    }

    pub fn themes(&self) -> &[CheckinTheme] {
        &self.themes
    }

    pub fn records(&self) -> &CheckinRecord {
        &self.records
    }

    pub fn theme(&self, id: &str) -> Option<&CheckinTheme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn selected(&self) -> &CheckinTheme {
        self.theme(&self.selected).unwrap_or(&self.themes[0])
    }

    fn require(&self, id: &str) -> Result<&CheckinTheme, ValidationError> {
        self.theme(id).ok_or_else(|| ValidationError::NotFound {
            kind: "theme",
            id: id.to_string(),
        })
    }

    /// # Errors
    /// Unknown theme id.
    pub fn select_theme(&mut self, id: &str) -> Result<(), ValidationError> {
        self.require(id)?;
        self.selected = id.to_string();
        Ok(())
    }

    pub fn is_checked(&self, theme_id: &str, date: NaiveDate) -> bool {
        self.records.is_checked(theme_id, date)
    }

    /// The dialog shown before [`Self::toggle`].
    ///
    /// # Errors
    /// Unknown theme id.
    pub fn toggle_prompt(&self, theme_id: &str, date: NaiveDate) -> Result<Confirmation, ValidationError> {
        self.require(theme_id)?;
        let day = date.format("%-m/%-d/%Y");
        Ok(if self.is_checked(theme_id, date) {
            Confirmation::checkin(
                "Cancel Check-in?",
                format!("Are you sure you want to cancel your check-in for {day}?"),
            )
        } else {
            Confirmation::checkin(
                "Confirm Check-in?",
                format!("Are you sure you want to check in for {day}?"),
            )
        })
    }

    /// Flip the check-in for `date`. Returns the new value.
    ///
    /// # Errors
    /// Unknown theme, or a date after `today`.
    pub fn toggle(&mut self, theme_id: &str, date: NaiveDate, today: NaiveDate) -> Result<bool, ValidationError> {
        self.require(theme_id)?;
        if date > today {
            return Err(ValidationError::FutureDate(date));
        }
        Ok(self.records.toggle(theme_id, date))
    }

    /// Consecutive checked days ending today, or ending yesterday when today
    /// is not checked yet.
    pub fn calculate_streak(&self, theme_id: &str, today: NaiveDate) -> u32 {
        let mut day = today;
        if !self.is_checked(theme_id, day) {
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => return 0,
            }
        }

        let mut streak = 0;
        while self.is_checked(theme_id, day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// # Errors
    /// Impossible year/month.
    pub fn calendar(
        &self,
        theme_id: &str,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<CalendarMonth, ValidationError> {
        CalendarMonth::build(year, month, today, |date| self.is_checked(theme_id, date))
    }

    /// Add a theme and select it.
    ///
    /// # Errors
    /// Empty name or one longer than `max_len` characters.
    pub fn add_theme(&mut self, name: &str, max_len: usize) -> Result<&CheckinTheme, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let len = name.chars().count();
        if len > max_len {
            return Err(ValidationError::NameTooLong { len, max: max_len });
        }
        let theme = CheckinTheme {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.selected = theme.id.clone();
        self.themes.push(theme);
        Ok(&self.themes[self.themes.len() - 1])
    }

    /// The dialog shown before [`Self::delete_theme`].
    ///
    /// # Errors
    /// The last theme can never be deleted; unknown theme id.
    pub fn delete_prompt(&self, id: &str) -> Result<Confirmation, ValidationError> {
        if self.themes.len() <= 1 {
            return Err(ValidationError::LastTheme);
        }
        let theme = self.require(id)?;
        Ok(Confirmation::danger(
            format!("Delete \"{}\"?", theme.name),
            "Are you sure? All check-in data for this theme will be permanently deleted.",
        ))
    }

    /// Remove a theme together with all of its check-ins. Both changes are
    /// applied together or not at all.
    ///
    /// # Errors
    /// Last remaining theme; unknown theme id. Nothing changes on error.
    pub fn delete_theme(&mut self, id: &str) -> Result<CheckinTheme, ValidationError> {
        if self.themes.len() <= 1 {
            return Err(ValidationError::LastTheme);
        }
        let index = self
            .themes
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "theme",
                id: id.to_string(),
            })?;

        let removed = self.themes.remove(index);
        self.records.remove_theme(id);
        if self.selected == id {
            self.selected = self.themes[0].id.clone();
        }
        Ok(removed)
    }

    /// # Errors
    /// `order` is not a permutation of the current theme ids.
    pub fn reorder_themes(&mut self, order: &[String]) -> Result<(), ValidationError> {
        let ids: Vec<String> = self.themes.iter().map(|t| t.id.clone()).collect();
        if !is_permutation(&ids, order) {
            return Err(ValidationError::InvalidOrder("themes"));
        }
        let mut reordered = Vec::with_capacity(self.themes.len());
        for id in order {
            if let Some(theme) = self.theme(id) {
                reordered.push(theme.clone());
            }
        }
        self.themes = reordered;
        Ok(())
    }
}
