//! User-managed focus tags shared by the focus timer and the stopwatch.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList {
    tags: Vec<String>,
}

impl Default for TagList {
    fn default() -> Self {
        Self {
            tags: vec!["Work".into(), "Study".into(), "Reading".into()],
        }
    }
}

impl TagList {
    pub fn from_tags(tags: Vec<String>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a trimmed tag. Returns the stored tag, or `None` when it was empty
    /// or already present.
    pub fn add(&mut self, tag: &str) -> Option<String> {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return None;
        }
        self.tags.push(tag.to_string());
        Some(tag.to_string())
    }

    pub fn delete(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Replace the order. `order` must be a permutation of the current tags.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidOrder`] otherwise; the list is unchanged.
    pub fn reorder(&mut self, order: &[String]) -> Result<(), ValidationError> {
        if !is_permutation(&self.tags, order) {
            return Err(ValidationError::InvalidOrder("tags"));
        }
        self.tags = order.to_vec();
        Ok(())
    }
}

pub(crate) fn is_permutation(current: &[String], order: &[String]) -> bool {
    if current.len() != order.len() {
        return false;
    }
    let mut a: Vec<&String> = current.iter().collect();
    let mut b: Vec<&String> = order.iter().collect();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trims_and_rejects_duplicates() {
        let mut tags = TagList::default();
        assert_eq!(tags.add("  Gym "), Some("Gym".to_string()));
        assert_eq!(tags.add("Gym"), None);
        assert_eq!(tags.add("   "), None);
        assert_eq!(tags.tags().len(), 4);
    }

    #[test]
    fn reorder_requires_permutation() {
        let mut tags = TagList::default();
        let order = vec!["Reading".to_string(), "Work".to_string(), "Study".to_string()];
        tags.reorder(&order).unwrap();
        assert_eq!(tags.tags(), order.as_slice());

        let bad = vec!["Reading".to_string(), "Work".to_string()];
        assert_eq!(tags.reorder(&bad), Err(ValidationError::InvalidOrder("tags")));
        assert_eq!(tags.tags(), order.as_slice());
    }

    #[test]
    fn delete_reports_presence() {
        let mut tags = TagList::default();
        assert!(tags.delete("Study"));
        assert!(!tags.delete("Study"));
    }
}
