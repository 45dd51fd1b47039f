//! Persistent key-value storage and TOML configuration.
//!
//! Every store list is saved as one JSON value under a fixed logical key.
//! [`KvStore`] is the seam between the application state and the backend:
//! [`SqliteStore`] on disk, [`MemoryStore`] for tests and dry runs.

mod config;
pub mod database;
pub mod memory;
pub mod persist;

pub use config::{AssistantConfig, CheckinConfig, Config, ScheduleConfig, TimerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Logical keys under which each list is persisted.
pub mod keys {
    pub const SCHEDULE_ITEMS: &str = "scheduleItems";
    pub const FOCUS_SESSIONS: &str = "focusSessions";
    pub const CHECKIN_THEMES: &str = "checkinThemes";
    pub const CHECKIN_DATA: &str = "checkinData";
    pub const FOCUS_TAGS: &str = "focusTags";
    pub const ASSISTANT_API_KEY: &str = "assistantApiKey";
}

/// Generic get/set/delete string store.
///
/// Implementations take `&self`; the application is single-threaded and the
/// backends handle their own interior mutability.
pub trait KvStore {
    /// # Errors
    /// Backend failure. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Backend failure.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Backend failure.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Write several keys so that either all of them land or none do.
    ///
    /// # Errors
    /// Backend failure; no entry has been written.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;
}

/// Returns `~/.config/daymark[-dev]/` based on DAYMARK_ENV.
///
/// Set DAYMARK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAYMARK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("daymark-dev")
    } else {
        base_dir.join("daymark")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
