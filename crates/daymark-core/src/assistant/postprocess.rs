//! Turns a model's JSON reply into schedule item data.
//!
//! Models do not always follow the requested shape, so the reply is read
//! leniently and then cleaned item by item.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, TimeDelta, Timelike};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::AssistantError;
use crate::schedule::{Category, ScheduleItemData};

static HHMM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}:\d{2})").expect("time prefix pattern is valid"));

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:for|lasts?|lasting)\s*(\d+(?:\.\d+)?)\s*(hour|hr|minute|min)s?")
        .expect("duration pattern is valid")
});

/// One reply entry before cleaning. Every field is optional here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    end_time: Option<String>,
    category: Option<String>,
}

/// `"13:00:00Z"` -> 13:00. Anything without a leading `HH:mm` is dropped.
pub fn clean_time(raw: Option<&str>) -> Option<NaiveTime> {
    let raw = raw?.trim();
    let prefix = HHMM_PREFIX.captures(raw)?.get(1)?.as_str();
    NaiveTime::parse_from_str(prefix, "%H:%M").ok()
}

/// Longest duration hint taken at face value; anything from a full day up
/// is ignored.
const MAX_HINT_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Duration mentioned in free text ("for 2 hours", "lasting 90 min"), in seconds.
pub fn duration_hint(text: &str) -> Option<i64> {
    let caps = DURATION.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    let minutes = if unit.starts_with('h') { value * 60.0 } else { value };
    let secs = (minutes * 60.0).round();
    if !secs.is_finite() || secs >= MAX_HINT_SECS {
        debug!(%text, "ignoring out-of-range duration hint");
        return None;
    }
    let secs = secs as i64;
    (secs > 0).then_some(secs)
}

/// End time implied by a duration hint in the title or description.
/// Wraps past midnight.
fn infer_end_time(start: NaiveTime, title: &str, description: Option<&str>) -> Option<NaiveTime> {
    let text = format!("{} {}", title, description.unwrap_or_default()).to_lowercase();
    let secs = duration_hint(&text)?;
    let (end, _) = start.overflowing_add_signed(TimeDelta::try_seconds(secs)?);
    end.with_second(0)
}

fn clean_item(raw: RawItem) -> Option<ScheduleItemData> {
    let title = raw.title.filter(|t| !t.trim().is_empty())?;
    let date = raw.date.filter(|d| !d.trim().is_empty())?;
    let date = match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            debug!(%date, error = %e, "dropping item with unreadable date");
            return None;
        }
    };

    let description = raw.description.filter(|d| !d.is_empty());
    let category = raw
        .category
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or(Category::Personal);

    let time = clean_time(raw.time.as_deref());
    let end_time = match time {
        None => None,
        Some(start) => clean_time(raw.end_time.as_deref())
            .or_else(|| infer_end_time(start, &title, description.as_deref())),
    };

    Some(ScheduleItemData {
        title,
        description,
        date,
        time,
        end_time,
        category: Some(category),
    })
}

/// # Errors
/// [`AssistantError::Malformed`] when the reply is not JSON or has the wrong
/// shape, [`AssistantError::NothingUnderstood`] when no usable item remains.
pub fn items_from_reply(reply: &str) -> Result<Vec<ScheduleItemData>, AssistantError> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| AssistantError::Malformed(e.to_string()))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(obj) if obj.contains_key("title") && obj.contains_key("date") => {
            vec![Value::Object(obj)]
        }
        other => {
            return Err(AssistantError::Malformed(format!(
                "expected a list of items, got {other}"
            )))
        }
    };

    let items: Vec<ScheduleItemData> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawItem>(entry).ok())
        .filter_map(clean_item)
        .collect();

    if items.is_empty() {
        return Err(AssistantError::NothingUnderstood);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn single_object_is_wrapped() {
        let items =
            items_from_reply(r#"{"title": "Dentist", "date": "2025-05-02", "time": "14:00"}"#)
                .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].time, Some(t(14, 0)));
        assert_eq!(items[0].category, Some(Category::Personal));
    }

    #[test]
    fn object_without_item_fields_is_malformed() {
        assert!(matches!(
            items_from_reply(r#"{"error": "nope"}"#),
            Err(AssistantError::Malformed(_))
        ));
        assert!(matches!(items_from_reply("not json"), Err(AssistantError::Malformed(_))));
    }

    #[test]
    fn items_missing_title_or_date_are_dropped() {
        let reply = r#"[
            {"title": "Keep", "date": "2025-05-02"},
            {"title": "", "date": "2025-05-02"},
            {"date": "2025-05-02"},
            {"title": "No date"}
        ]"#;
        let items = items_from_reply(reply).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Keep");
    }

    #[test]
    fn empty_result_is_an_error() {
        assert!(matches!(items_from_reply("[]"), Err(AssistantError::NothingUnderstood)));
        assert!(matches!(
            items_from_reply(r#"[{"title": "x"}]"#),
            Err(AssistantError::NothingUnderstood)
        ));
    }

    #[test]
    fn times_are_trimmed_to_prefix() {
        assert_eq!(clean_time(Some("13:00:00Z")), Some(t(13, 0)));
        assert_eq!(clean_time(Some("09:30")), Some(t(9, 30)));
        assert_eq!(clean_time(Some("9am")), None);
        assert_eq!(clean_time(Some("25:00")), None);
        assert_eq!(clean_time(None), None);
    }

    #[test]
    fn end_time_dropped_without_start() {
        let items =
            items_from_reply(r#"[{"title": "x", "date": "2025-05-02", "endTime": "10:00"}]"#)
                .unwrap();
        assert_eq!(items[0].time, None);
        assert_eq!(items[0].end_time, None);
    }

    #[test]
    fn end_time_inferred_from_duration_text() {
        let reply = r#"[
            {"title": "Workout for 1.5 hours", "date": "2025-05-02", "time": "18:00", "endTime": null},
            {"title": "Call", "description": "Lasting 20 min", "date": "2025-05-02", "time": "23:50"},
            {"title": "Meet friends", "date": "2025-05-02", "time": "20:00", "endTime": null}
        ]"#;
        let items = items_from_reply(reply).unwrap();
        assert_eq!(items[0].end_time, Some(t(19, 30)));
        assert_eq!(items[1].end_time, Some(t(0, 10)));
        assert_eq!(items[2].end_time, None);
    }

    #[test]
    fn explicit_end_time_wins_over_hint() {
        let reply = r#"[{"title": "Run for 2 hours", "date": "2025-05-02", "time": "07:00", "endTime": "07:45"}]"#;
        assert_eq!(items_from_reply(reply).unwrap()[0].end_time, Some(t(7, 45)));
    }

    #[test]
    fn unknown_category_becomes_personal() {
        let reply = r#"[{"title": "x", "date": "2025-05-02", "category": "Work"},
                        {"title": "y", "date": "2025-05-02", "category": "hobby"}]"#;
        let items = items_from_reply(reply).unwrap();
        assert_eq!(items[0].category, Some(Category::Work));
        assert_eq!(items[1].category, Some(Category::Personal));
    }

    #[test]
    fn duration_hint_units() {
        assert_eq!(duration_hint("for 2 hrs"), Some(7200));
        assert_eq!(duration_hint("lasts 45 minutes"), Some(2700));
        assert_eq!(duration_hint("for 0 min"), None);
        assert_eq!(duration_hint("at 5pm"), None);
    }

    #[test]
    fn huge_duration_hint_is_ignored() {
        let reply = r#"[{"title": "Nap for 99999999999999 hours", "date": "2025-05-02", "time": "10:00"}]"#;
        let items = items_from_reply(reply).unwrap();
        assert_eq!(items[0].time, Some(t(10, 0)));
        assert_eq!(items[0].end_time, None);

        assert_eq!(duration_hint("for 24 hours"), None);
        assert_eq!(duration_hint(&format!("for {} min", "9".repeat(400))), None);
        assert_eq!(duration_hint("for 23 hours"), Some(23 * 3600));
    }
}
