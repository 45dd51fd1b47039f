//! The focus session log.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One committed active interval of a focus timer or stopwatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    /// When the interval was committed, not when it started.
    pub completed_at: DateTime<Utc>,
    /// Whole seconds, always positive.
    pub duration: u64,
    #[serde(default)]
    pub tag: Option<String>,
}

impl FocusSession {
    pub fn new(duration: u64, tag: Option<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            completed_at,
            duration,
            tag,
        }
    }

    /// Calendar date of the commit in local time.
    pub fn local_date(&self) -> NaiveDate {
        self.completed_at.with_timezone(&Local).date_naive()
    }
}

/// Append/delete-only log. Entries are never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLog {
    sessions: Vec<FocusSession>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: Vec<FocusSession>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[FocusSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn append(&mut self, session: FocusSession) {
        self.sessions.push(session);
    }

    /// Remove one session. Returns false if the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() != before
    }

    /// Sessions committed on `today`, most recent first.
    pub fn todays_sessions(&self, today: NaiveDate) -> Vec<&FocusSession> {
        let mut out: Vec<&FocusSession> = self
            .sessions
            .iter()
            .filter(|s| s.local_date() == today)
            .collect();
        out.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        out
    }

    pub fn all_time_total(&self) -> u64 {
        self.sessions.iter().map(|s| s.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn todays_sessions_newest_first() {
        let mut log = SessionLog::new();
        log.append(FocusSession::new(60, None, at(2025, 3, 10, 9)));
        log.append(FocusSession::new(30, None, at(2025, 3, 9, 22)));
        log.append(FocusSession::new(90, None, at(2025, 3, 10, 15)));

        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let durations: Vec<u64> = log.todays_sessions(today).iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![90, 60]);
        assert_eq!(log.all_time_total(), 180);
    }

    #[test]
    fn delete_removes_only_that_session() {
        let mut log = SessionLog::new();
        let keep = FocusSession::new(10, None, Utc::now());
        let gone = FocusSession::new(20, None, Utc::now());
        log.append(keep.clone());
        log.append(gone.clone());

        assert!(log.delete(&gone.id));
        assert!(!log.delete(&gone.id));
        assert_eq!(log.sessions(), &[keep]);
    }

    #[test]
    fn serializes_camel_case() {
        let session = FocusSession::new(25, Some("Work".into()), Utc::now());
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("completedAt").is_some());
        assert_eq!(json["duration"], 25);
    }
}
