use std::cmp::Ordering;

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{Category, ScheduleItem, ScheduleItemData};

/// Which slice of the schedule a schedule view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFilter {
    /// Today's open items.
    Today,
    /// Every open item.
    All,
    Completed,
}

impl ScheduleFilter {
    pub fn matches(&self, item: &ScheduleItem, today: NaiveDate) -> bool {
        match self {
            ScheduleFilter::Today => item.date == today && !item.completed,
            ScheduleFilter::All => !item.completed,
            ScheduleFilter::Completed => item.completed,
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            ScheduleFilter::Today => "You have no tasks scheduled for today.",
            ScheduleFilter::All => "Your schedule is empty.",
            ScheduleFilter::Completed => "You haven't completed any tasks yet.",
        }
    }
}

/// Date ascending, then start time ascending; all-day items after timed
/// items on the same date.
pub fn compare_for_display(a: &ScheduleItem, b: &ScheduleItem) -> Ordering {
    a.date.cmp(&b.date).then_with(|| match (a.time, b.time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

/// Ordered collection of schedule items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleStore {
    items: Vec<ScheduleItem>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ScheduleItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Append a batch. Each item gets a fresh id and starts open.
    pub fn add(&mut self, batch: Vec<ScheduleItemData>) -> Vec<String> {
        batch
            .into_iter()
            .map(|data| {
                let id = Uuid::new_v4().to_string();
                self.items.push(ScheduleItem::from_data(id.clone(), data));
                id
            })
            .collect()
    }

    /// Replace the data fields of `id`. Returns false if no such item.
    pub fn update(&mut self, id: &str, data: ScheduleItemData) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.apply(data);
                true
            }
            None => false,
        }
    }

    /// Flip `completed`. Returns the new value.
    pub fn toggle_complete(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Filtered and sorted view; never mutates.
    pub fn project(&self, filter: ScheduleFilter, today: NaiveDate) -> Vec<&ScheduleItem> {
        let mut out: Vec<&ScheduleItem> =
            self.items.iter().filter(|i| filter.matches(i, today)).collect();
        out.sort_by(|a, b| compare_for_display(a, b));
        out
    }

    /// Example schedule shown on first run or after a corrupt load.
    pub fn seed(today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        let entry = |id: &str,
                     title: &str,
                     description: Option<&str>,
                     date: NaiveDate,
                     time: Option<NaiveTime>,
                     end_time: Option<NaiveTime>,
                     category: Category,
                     completed: bool| ScheduleItem {
            id: id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            date,
            time,
            end_time,
            category: Some(category),
            completed,
        };
        Self {
            items: vec![
                entry(
                    "1",
                    "Project Stand-up Meeting",
                    Some("Discuss progress on the new dashboard feature."),
                    today,
                    hm(9, 0),
                    hm(9, 30),
                    Category::Work,
                    false,
                ),
                entry(
                    "6",
                    "Learn Rust traits",
                    Some("Focus on generics and trait objects."),
                    today,
                    hm(10, 0),
                    hm(11, 30),
                    Category::Study,
                    false,
                ),
                entry(
                    "2",
                    "Dentist Appointment",
                    Some("Annual check-up."),
                    today,
                    hm(14, 30),
                    None,
                    Category::Health,
                    false,
                ),
                entry(
                    "3",
                    "Go to the gym",
                    Some("Leg day workout."),
                    today,
                    hm(18, 0),
                    None,
                    Category::Fitness,
                    true,
                ),
                entry(
                    "4",
                    "Meet friends for dinner",
                    None,
                    tomorrow,
                    hm(19, 30),
                    None,
                    Category::Social,
                    false,
                ),
                entry(
                    "5",
                    "Book flights to Bali",
                    Some("Find good deals for the holidays."),
                    tomorrow,
                    None,
                    None,
                    Category::Travel,
                    false,
                ),
            ],
        }
    }
}
