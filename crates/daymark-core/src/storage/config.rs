//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus timer defaults and presets
//! - The optimistic completion delay
//! - Check-in theme name limits
//! - AI assistant endpoint and model
//!
//! Configuration is stored at `~/.config/daymark/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::MAX_CLOCK_SECS;

/// Focus timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub default_focus_minutes: u64,
    #[serde(default = "default_presets")]
    pub presets: Vec<u64>,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u64,
}

/// Schedule view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinConfig {
    #[serde(default = "default_max_theme_name_len")]
    pub max_theme_name_len: usize,
}

/// AI assistant endpoint configuration. The API key lives in the kv store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/daymark/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub checkin: CheckinConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

// Default functions

fn default_focus_minutes() -> u64 {
    25
}
fn default_presets() -> Vec<u64> {
    vec![25, 45, 60, 90]
}
fn default_max_minutes() -> u64 {
    MAX_CLOCK_SECS / 60
}
fn default_completion_delay_ms() -> u64 {
    300
}
fn default_max_theme_name_len() -> usize {
    20
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_focus_minutes: default_focus_minutes(),
            presets: default_presets(),
            max_minutes: default_max_minutes(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            completion_delay_ms: default_completion_delay_ms(),
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            max_theme_name_len: default_max_theme_name_len(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from `path`, writing the defaults there if the file is missing.
    ///
    /// # Errors
    /// The file exists but cannot be parsed, or defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// # Errors
    /// Serialization or write failure.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// See [`Config::save_to`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every leaf as `(dot.path, value)`, in declaration order of sections.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&path, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    /// Unknown key, unparsable value, or a value that breaks a limit. The
    /// configuration is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    /// See [`Config::apply`] and [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// # Errors
    /// A value outside its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = MAX_CLOCK_SECS / 60;
        let invalid = |key: &str, message: String| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };
        if self.timer.max_minutes == 0 || self.timer.max_minutes > limit {
            return invalid("timer.max_minutes", format!("must be between 1 and {limit}"));
        }
        if self.timer.default_focus_minutes > self.timer.max_minutes {
            return invalid(
                "timer.default_focus_minutes",
                format!("must not exceed timer.max_minutes ({})", self.timer.max_minutes),
            );
        }
        if let Some(p) = self.timer.presets.iter().find(|&&p| p > self.timer.max_minutes) {
            return invalid("timer.presets", format!("preset {p} exceeds timer.max_minutes"));
        }
        if self.checkin.max_theme_name_len == 0 {
            return invalid("checkin.max_theme_name_len", "must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn default_focus_secs(&self) -> u64 {
        (self.timer.default_focus_minutes * 60).min(self.max_focus_secs())
    }

    pub fn max_focus_secs(&self) -> u64 {
        (self.timer.max_minutes * 60).min(MAX_CLOCK_SECS)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.schedule.completion_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\ndefault_focus_minutes = 50\n").unwrap();
        assert_eq!(parsed.timer.default_focus_minutes, 50);
        assert_eq!(parsed.timer.presets, vec![25, 45, 60, 90]);
        assert_eq!(parsed.assistant.model, "gemini-2.5-flash");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.default_focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("assistant.model").as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(cfg.get("timer.presets").as_deref(), Some("[25,45,60,90]"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn apply_updates_number_and_list() {
        let mut cfg = Config::default();
        cfg.apply("schedule.completion_delay_ms", "500").unwrap();
        cfg.apply("timer.presets", "[10, 20]").unwrap();
        assert_eq!(cfg.completion_delay(), Duration::from_millis(500));
        assert_eq!(cfg.timer.presets, vec![10, 20]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("timer.default_focus_minutes", "soon");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn apply_rejects_out_of_range_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.default_focus_minutes", "1000").is_err());
        assert!(cfg.apply("timer.max_minutes", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_lists_every_leaf() {
        let entries = Config::default().entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"timer.default_focus_minutes"));
        assert!(keys.contains(&"checkin.max_theme_name_len"));
        assert!(keys.contains(&"assistant.base_url"));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("timer.default_focus_minutes", "45").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().default_focus_secs(), 45 * 60);
    }

    #[test]
    fn load_from_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 'nope'").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
