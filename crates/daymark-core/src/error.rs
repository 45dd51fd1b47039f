//! Core error types for daymark-core.
//!
//! Errors are grouped by concern (storage, configuration, validation,
//! assistant) and aggregated into [`CoreError`].

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for daymark-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected input
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// AI assistant failures
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A value could not be encoded before writing
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The data directory could not be created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Input rejected at the entry boundary. Never persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title and Date are required.")]
    MissingTitleOrDate,

    #[error("Year cannot exceed {max} (got {year})")]
    YearOutOfRange { year: i32, max: i32 },

    #[error("Cannot set an end time without a start time.")]
    EndTimeWithoutStart,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid {field} '{value}', expected HH:mm")]
    InvalidTime { field: &'static str, value: String },

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name is too long ({len} characters, max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Cannot change the clock while it is running")]
    ClockRunning,

    #[error("No active timer")]
    NoActiveTimer,

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("You must have at least one theme.")]
    LastTheme,

    #[error("Cannot check in for a future date ({0})")]
    FutureDate(NaiveDate),

    #[error("New order for {0} must contain every existing entry exactly once")]
    InvalidOrder(&'static str),
}

/// AI assistant failures. Surfaced to the user, never retried.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant API key is not set. Add it with `daymark assistant key <KEY>`.")]
    MissingCredential,

    #[error("Request to assistant failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Assistant returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Assistant response could not be read: {0}")]
    Malformed(String),

    #[error("AI could not understand the input. Please try being more specific or add it manually.")]
    NothingUnderstood,

    #[error("Invalid assistant endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
