//! Entry-time validation for the item form.
//!
//! Drafts hold raw text exactly as typed. Nothing reaches the store until
//! [`ItemDraft::validate`] turns it into [`ScheduleItemData`].

use chrono::{Datelike, NaiveDate, NaiveTime};

use super::item::{hhmm, Category, ScheduleItem, ScheduleItemData};
use crate::error::ValidationError;

pub const MAX_YEAR: i32 = 2999;

pub const END_TIME_CLEARED_NOTICE: &str = "End time cleared because start time was removed.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub end_time: String,
    pub category: String,
}

impl ItemDraft {
    /// Prefill the form for editing an existing item.
    pub fn from_item(item: &ScheduleItem) -> Self {
        let fmt = |t: Option<NaiveTime>| {
            t.map(|t| t.format(hhmm::FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            date: item.date.format("%Y-%m-%d").to_string(),
            time: fmt(item.time),
            end_time: fmt(item.end_time),
            category: item.category.map(|c| c.to_string()).unwrap_or_default(),
        }
    }

    /// Clear the start time. Any end time goes with it; returns true when
    /// that happened so the form can show [`END_TIME_CLEARED_NOTICE`].
    pub fn clear_time(&mut self) -> bool {
        self.time.clear();
        if self.end_time.trim().is_empty() {
            return false;
        }
        self.end_time.clear();
        true
    }

    /// # Errors
    /// Returns the first rule the draft breaks.
    pub fn validate(&self) -> Result<ScheduleItemData, ValidationError> {
        let title = self.title.trim();
        let date = self.date.trim();
        if title.is_empty() || date.is_empty() {
            return Err(ValidationError::MissingTitleOrDate);
        }

        let date = parse_date(date)?;
        let time = parse_time("start time", &self.time)?;
        let end_time = parse_time("end time", &self.end_time)?;
        if end_time.is_some() && time.is_none() {
            return Err(ValidationError::EndTimeWithoutStart);
        }

        let category = match self.category.trim() {
            "" => None,
            c => Some(c.parse::<Category>()?),
        };
        let description = match self.description.trim() {
            "" => None,
            d => Some(d.to_string()),
        };

        Ok(ScheduleItemData {
            title: title.to_string(),
            description,
            date,
            time,
            end_time,
            category,
        })
    }
}

/// `YYYY-MM-DD` with the year capped at [`MAX_YEAR`].
///
/// # Errors
/// Malformed dates and years past the cap are rejected.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
    if date.year() > MAX_YEAR {
        return Err(ValidationError::YearOutOfRange {
            year: date.year(),
            max: MAX_YEAR,
        });
    }
    Ok(date)
}

fn parse_time(field: &'static str, raw: &str) -> Result<Option<NaiveTime>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(raw, hhmm::FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidTime {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            title: "Dentist".into(),
            date: "2025-05-01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_draft_is_all_day() {
        let data = draft().validate().unwrap();
        assert!(data.time.is_none());
        assert!(data.description.is_none());
    }

    #[test]
    fn title_and_date_required() {
        let mut d = draft();
        d.title = "   ".into();
        assert_eq!(d.validate(), Err(ValidationError::MissingTitleOrDate));

        let mut d = draft();
        d.date.clear();
        assert_eq!(d.validate(), Err(ValidationError::MissingTitleOrDate));
    }

    #[test]
    fn year_capped() {
        let mut d = draft();
        d.date = "3000-01-01".into();
        assert_eq!(
            d.validate(),
            Err(ValidationError::YearOutOfRange { year: 3000, max: MAX_YEAR })
        );
        d.date = "2999-12-31".into();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn end_time_needs_start_time() {
        let mut d = draft();
        d.end_time = "10:00".into();
        assert_eq!(d.validate(), Err(ValidationError::EndTimeWithoutStart));

        d.time = "09:00".into();
        let data = d.validate().unwrap();
        assert_eq!(data.end_time, NaiveTime::from_hms_opt(10, 0, 0));
    }

    #[test]
    fn clearing_start_clears_end() {
        let mut d = draft();
        d.time = "09:00".into();
        d.end_time = "10:00".into();
        assert!(d.clear_time());
        assert!(d.end_time.is_empty());
        assert!(!d.clear_time());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn malformed_values_rejected() {
        let mut d = draft();
        d.date = "05/01/2025".into();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidDate(_))));

        let mut d = draft();
        d.time = "9am".into();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidTime { .. })));

        let mut d = draft();
        d.category = "chores".into();
        assert!(matches!(d.validate(), Err(ValidationError::UnknownCategory(_))));
    }

    #[test]
    fn edit_prefill_roundtrips() {
        let mut d = draft();
        d.time = "09:15".into();
        d.end_time = "10:45".into();
        d.category = "health".into();
        let item = ScheduleItem::from_data("x".into(), d.validate().unwrap());
        assert_eq!(ItemDraft::from_item(&item), d);
    }
}
