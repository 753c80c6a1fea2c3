//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Countdown duration, reminder interval and auto-restart
//! - Runtime cadence (tick length, restart cooldown)
//! - Log level
//!
//! Configuration is stored at `~/.config/countdown/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{data_dir, data_dir_path};
use crate::error::{ConfigError, CoreError, TimerError};
use crate::runtime::RuntimeOptions;
use crate::timer::{IntervalSetting, NotificationInterval, TimerConfig};

/// Countdown defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSection {
    #[serde(default = "default_duration")]
    pub duration_secs: i64,
    #[serde(default)]
    pub notification_interval: NotificationInterval,
    #[serde(default)]
    pub auto_restart: bool,
}

/// Runtime cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSection {
    #[serde(default = "default_1000")]
    pub tick_ms: u64,
    #[serde(default = "default_1000")]
    pub restart_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/countdown/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub log: LogSection,
}

fn default_duration() -> i64 {
    60
}
fn default_1000() -> u64 {
    1000
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for TimerSection {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            notification_interval: NotificationInterval::Disabled,
            auto_restart: false,
        }
    }
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            restart_delay_ms: 1000,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Fields that hold either a keyword or a number.
const KEYWORD_OR_NUMBER_KEYS: &[&str] = &["notification_interval"];

fn number_or_string(value: &str) -> serde_json::Value {
    value
        .parse::<i64>()
        .map(|n| serde_json::Value::Number(n.into()))
        .unwrap_or_else(|_| serde_json::Value::String(value.into()))
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            }
        }
        let obj = current
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(leaf)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string()))?,
            // Keyword-or-number fields ("disabled" / 300) are resolved by
            // the typed deserialize in `set`.
            serde_json::Value::Number(_) => number_or_string(value),
            serde_json::Value::String(_) if KEYWORD_OR_NUMBER_KEYS.contains(&leaf) => {
                number_or_string(value)
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            serde_json::Value::Null => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match Self::read_from(path)? {
            Some(cfg) => Ok(cfg),
            None => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Read the default location without writing anything. A missing file
    /// yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Self, CoreError> {
        let path = data_dir_path().join("config.toml");
        Ok(Self::read_from(&path)?.unwrap_or_default())
    }

    /// Parse the file at `path`, or `None` if it does not exist.
    pub fn read_from(path: &Path) -> Result<Option<Self>, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(Some(cfg))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
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

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Validated countdown configuration.
    pub fn timer_config(&self) -> Result<TimerConfig, TimerError> {
        let interval = match self.timer.notification_interval.as_secs() {
            None => IntervalSetting::Disabled,
            Some(secs) => IntervalSetting::Seconds(i64::try_from(secs).unwrap_or(i64::MAX)),
        };
        TimerConfig::new(self.timer.duration_secs, interval, self.timer.auto_restart)
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            tick: Duration::from_millis(self.runtime.tick_ms.max(1)),
            restart_delay: Duration::from_millis(self.runtime.restart_delay_ms),
        }
    }
}
