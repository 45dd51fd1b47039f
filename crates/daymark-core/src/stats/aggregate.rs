//! Per-tag totals, day milestones and human-readable durations.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::session::{FocusSession, SessionLog};

/// Bucket for sessions committed without a tag.
pub const UNTAGGED: &str = "Untagged";

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTotal {
    pub name: String,
    pub seconds: u64,
}

/// Whole days of focus reached, plus progress toward the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestones {
    pub completed_count: u64,
    /// 0.0 ..< 1.0
    pub progress_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub sessions: Vec<FocusSession>,
    pub total_seconds: u64,
    pub by_tag: Vec<TagTotal>,
}

/// Sum durations per tag, largest first. Ties keep first-seen order.
pub fn aggregate_by_tag<'a, I>(sessions: I) -> Vec<TagTotal>
where
    I: IntoIterator<Item = &'a FocusSession>,
{
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, u64> = HashMap::new();
    for session in sessions {
        let name = session.tag.as_deref().unwrap_or(UNTAGGED).to_string();
        let entry = totals.entry(name.clone()).or_insert_with(|| {
            order.push(name);
            0
        });
        *entry += session.duration;
    }

    let mut out: Vec<TagTotal> = order
        .into_iter()
        .map(|name| {
            let seconds = totals[&name];
            TagTotal { name, seconds }
        })
        .collect();
    out.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    out
}

pub fn milestones(total_seconds: u64) -> Milestones {
    Milestones {
        completed_count: total_seconds / SECONDS_PER_DAY,
        progress_fraction: (total_seconds % SECONDS_PER_DAY) as f64 / SECONDS_PER_DAY as f64,
    }
}

impl SessionLog {
    pub fn today_summary(&self, today: NaiveDate) -> TodaySummary {
        let sessions = self.todays_sessions(today);
        let total_seconds = sessions.iter().map(|s| s.duration).sum();
        let by_tag = aggregate_by_tag(sessions.iter().copied());
        TodaySummary {
            sessions: sessions.into_iter().cloned().collect(),
            total_seconds,
            by_tag,
        }
    }

    pub fn milestones(&self) -> Milestones {
        milestones(self.all_time_total())
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// "45 seconds", "12 minutes", "2 hours 5 minutes".
pub fn format_duration(total_seconds: u64) -> String {
    if total_seconds == 0 {
        return "0 seconds".to_string();
    }
    if total_seconds < 60 {
        return plural(total_seconds, "second");
    }
    if total_seconds < 3600 {
        let minutes = (total_seconds as f64 / 60.0).round() as u64;
        return plural(minutes, "minute");
    }
    let hours = total_seconds / 3600;
    let minutes = ((total_seconds % 3600) as f64 / 60.0).round() as u64;
    let mut out = plural(hours, "hour");
    if minutes > 0 {
        out.push(' ');
        out.push_str(&plural(minutes, "minute"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn session(tag: Option<&str>, duration: u64) -> FocusSession {
        FocusSession::new(duration, tag.map(str::to_string), Utc::now())
    }

    #[test]
    fn groups_by_tag_descending() {
        let sessions = vec![
            session(Some("Work"), 60),
            session(None, 30),
            session(Some("Work"), 10),
        ];
        let totals = aggregate_by_tag(&sessions);
        assert_eq!(
            totals,
            vec![
                TagTotal { name: "Work".into(), seconds: 70 },
                TagTotal { name: "Untagged".into(), seconds: 30 },
            ]
        );
    }

    #[test]
    fn milestones_for_25_hours() {
        let m = milestones(90_000);
        assert_eq!(m.completed_count, 1);
        assert!((m.progress_fraction - 3600.0 / 86400.0).abs() < 1e-9);
        assert!((m.progress_fraction - 0.0417).abs() < 1e-4);
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(45), "45 seconds");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(1530), "26 minutes");
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(7500), "2 hours 5 minutes");
    }

    proptest! {
        #[test]
        fn milestones_recompose_total(total in 0u64..10_000_000) {
            let m = milestones(total);
            let rebuilt = m.completed_count * SECONDS_PER_DAY
                + (m.progress_fraction * SECONDS_PER_DAY as f64).round() as u64;
            prop_assert_eq!(rebuilt, total);
            prop_assert!(m.progress_fraction < 1.0);
        }
    }
}
