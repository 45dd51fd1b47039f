use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fixed set of schedule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Health,
    Fitness,
    Shopping,
    Social,
    Finance,
    Travel,
    Study,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Fitness,
        Category::Shopping,
        Category::Social,
        Category::Finance,
        Category::Travel,
        Category::Study,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Fitness => "fitness",
            Category::Shopping => "shopping",
            Category::Social => "social",
            Category::Finance => "finance",
            Category::Travel => "travel",
            Category::Study => "study",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// `HH:mm` wire format for optional clock times.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_some(&t.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Everything the user (or the assistant) supplies for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Start time; `None` for an all-day item.
    #[serde(default, with = "hhmm")]
    pub time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl ScheduleItemData {
    /// Enforce "no end time without a start time".
    pub fn normalized(mut self) -> Self {
        if self.time.is_none() {
            self.end_time = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredItem")]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm")]
    pub time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub completed: bool,
}

/// Wire shape of a persisted item. Loading goes through it so a stored end
/// time without a start time is dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    date: NaiveDate,
    #[serde(default, with = "hhmm")]
    time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    end_time: Option<NaiveTime>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    completed: bool,
}

impl From<StoredItem> for ScheduleItem {
    fn from(stored: StoredItem) -> Self {
        let mut item = ScheduleItem::from_data(
            stored.id,
            ScheduleItemData {
                title: stored.title,
                description: stored.description,
                date: stored.date,
                time: stored.time,
                end_time: stored.end_time,
                category: stored.category,
            },
        );
        item.completed = stored.completed;
        item
    }
}

impl ScheduleItem {
    pub fn from_data(id: String, data: ScheduleItemData) -> Self {
        let data = data.normalized();
        Self {
            id,
            title: data.title,
            description: data.description,
            date: data.date,
            time: data.time,
            end_time: data.end_time,
            category: data.category,
            completed: false,
        }
    }

    pub fn data(&self) -> ScheduleItemData {
        ScheduleItemData {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            time: self.time,
            end_time: self.end_time,
            category: self.category,
        }
    }

    /// Replace every data field, keeping `id` and `completed`.
    pub fn apply(&mut self, data: ScheduleItemData) {
        let data = data.normalized();
        self.title = data.title;
        self.description = data.description;
        self.date = data.date;
        self.time = data.time;
        self.end_time = data.end_time;
        self.category = data.category;
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    /// Length of the item's time range in seconds, if it has a positive one.
    /// This is what "focus on this item" preloads into the focus timer.
    pub fn focus_duration_secs(&self) -> Option<u64> {
        let (start, end) = (self.time?, self.end_time?);
        let secs = (end - start).num_seconds();
        (secs > 0).then_some(secs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, "%H:%M").ok()
    }

    fn data() -> ScheduleItemData {
        ScheduleItemData {
            title: "Stand-up".into(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: t("09:00"),
            end_time: t("09:30"),
            category: Some(Category::Work),
        }
    }

    #[test]
    fn wire_format_uses_hhmm() {
        let item = ScheduleItem::from_data("1".into(), data());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["time"], "09:00");
        assert_eq!(json["endTime"], "09:30");
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["category"], "work");

        let back: ScheduleItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn accepts_sparse_payload() {
        let item: ScheduleItem = serde_json::from_str(
            r#"{"id":"5","title":"Book flights","description":null,"date":"2025-02-01","time":null,"endTime":null}"#,
        )
        .unwrap();
        assert!(item.is_all_day());
        assert!(item.category.is_none());
        assert!(!item.completed);
    }

    #[test]
    fn end_time_dropped_without_start() {
        let mut d = data();
        d.time = None;
        let item = ScheduleItem::from_data("1".into(), d);
        assert!(item.end_time.is_none());
    }

    #[test]
    fn focus_duration_from_range() {
        let item = ScheduleItem::from_data("1".into(), data());
        assert_eq!(item.focus_duration_secs(), Some(1800));

        let mut d = data();
        d.end_time = t("08:00");
        assert_eq!(ScheduleItem::from_data("2".into(), d).focus_duration_secs(), None);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Travel".parse::<Category>().unwrap(), Category::Travel);
        assert!("chores".parse::<Category>().is_err());
    }

    #[test]
    fn stored_end_time_without_start_is_dropped_on_load() {
        let raw = r#"{"id":"x","title":"Lunch","date":"2025-03-15","endTime":"13:00","completed":true}"#;
        let item: ScheduleItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.time, None);
        assert_eq!(item.end_time, None);
        assert!(item.completed);

        let raw = r#"{"id":"y","title":"Gym","date":"2025-03-15","time":"18:00","endTime":"19:00"}"#;
        let item: ScheduleItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.end_time, t("19:00"));
    }
}
