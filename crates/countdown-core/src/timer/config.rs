//! Validated timer configuration.
//!
//! Raw caller input is signed so that zero and negative values can be
//! reported as errors instead of being unrepresentable at the call site.
//! Once built, a [`TimerConfig`] is always valid.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimerError;

/// Requested notification interval, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSetting {
    Disabled,
    Seconds(i64),
}

impl FromStr for IntervalSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("disabled") {
            return Ok(IntervalSetting::Disabled);
        }
        s.parse::<i64>()
            .map(IntervalSetting::Seconds)
            .map_err(|_| format!("expected \"disabled\" or a number of seconds, got '{s}'"))
    }
}

/// Validated notification interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationInterval {
    #[default]
    Disabled,
    Every(NonZeroU64),
}

impl NotificationInterval {
    /// Validate a requested interval. Non-positive seconds are rejected,
    /// never silently treated as disabled.
    pub fn from_setting(setting: IntervalSetting) -> Result<Self, TimerError> {
        match setting {
            IntervalSetting::Disabled => Ok(NotificationInterval::Disabled),
            IntervalSetting::Seconds(secs) => u64::try_from(secs)
                .ok()
                .and_then(NonZeroU64::new)
                .map(NotificationInterval::Every)
                .ok_or(TimerError::InvalidInterval(secs)),
        }
    }

    pub fn as_secs(&self) -> Option<u64> {
        match self {
            NotificationInterval::Disabled => None,
            NotificationInterval::Every(secs) => Some(secs.get()),
        }
    }
}

impl fmt::Display for NotificationInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationInterval::Disabled => f.write_str("disabled"),
            NotificationInterval::Every(secs) => write!(f, "{secs}"),
        }
    }
}

impl FromStr for NotificationInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let setting = s.parse::<IntervalSetting>()?;
        NotificationInterval::from_setting(setting).map_err(|e| e.to_string())
    }
}

// Stored as "disabled" or a number so config files stay hand-editable.
impl Serialize for NotificationInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NotificationInterval::Disabled => serializer.serialize_str("disabled"),
            NotificationInterval::Every(secs) => serializer.serialize_u64(secs.get()),
        }
    }
}

impl<'de> Deserialize<'de> for NotificationInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Secs(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => {
                NotificationInterval::from_setting(IntervalSetting::Seconds(secs))
                    .map_err(serde::de::Error::custom)
            }
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Immutable timer configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimerConfig")]
pub struct TimerConfig {
    duration_secs: u64,
    notification_interval: NotificationInterval,
    auto_restart: bool,
}

impl TimerConfig {
    /// Build a config from raw caller input.
    ///
    /// # Errors
    ///
    /// `InvalidDuration` when `duration_secs <= 0`, `InvalidInterval` when
    /// the interval is a non-positive number of seconds.
    pub fn new(
        duration_secs: i64,
        interval: IntervalSetting,
        auto_restart: bool,
    ) -> Result<Self, TimerError> {
        let duration = u64::try_from(duration_secs)
            .ok()
            .filter(|d| *d > 0)
            .ok_or(TimerError::InvalidDuration(duration_secs))?;
        let notification_interval = NotificationInterval::from_setting(interval)?;
        Ok(Self {
            duration_secs: duration,
            notification_interval,
            auto_restart,
        })
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn notification_interval(&self) -> NotificationInterval {
        self.notification_interval
    }

    pub fn auto_restart(&self) -> bool {
        self.auto_restart
    }
}

#[derive(Deserialize)]
struct RawTimerConfig {
    duration_secs: i64,
    #[serde(default)]
    notification_interval: NotificationInterval,
    #[serde(default)]
    auto_restart: bool,
}

impl TryFrom<RawTimerConfig> for TimerConfig {
    type Error = TimerError;

    fn try_from(raw: RawTimerConfig) -> Result<Self, Self::Error> {
        let interval = match raw.notification_interval {
            NotificationInterval::Disabled => IntervalSetting::Disabled,
            NotificationInterval::Every(secs) => {
                IntervalSetting::Seconds(i64::try_from(secs.get()).unwrap_or(i64::MAX))
            }
        };
        TimerConfig::new(raw.duration_secs, interval, raw.auto_restart)
    }
}

impl Default for TimerConfig {
    /// One minute, no reminders, no auto-restart.
    fn default() -> Self {
        Self {
            duration_secs: 60,
            notification_interval: NotificationInterval::Disabled,
            auto_restart: false,
        }
    }
}
