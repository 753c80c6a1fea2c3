use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Progress, TimerConfig, TimerStatus};

/// Every state change in the countdown produces an Event.
/// The render layer and notification sinks subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Configured {
        config: TimerConfig,
        at: DateTime<Utc>,
    },
    TimerStarted {
        elapsed_secs: u64,
        duration_secs: u64,
        /// Continued a paused run instead of starting fresh.
        resumed: bool,
        /// Started by the auto-restart controller rather than the caller.
        auto_restarted: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    Tick {
        elapsed_secs: u64,
        progress: Progress,
        at: DateTime<Utc>,
    },
    Notified {
        minutes_elapsed: u64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    RestartScheduled {
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    /// Terminal: the run completed and no restart follows.
    TimerFinished {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        elapsed_secs: u64,
        remaining_secs: u64,
        progress: Progress,
        config: TimerConfig,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::Configured { at, .. }
            | Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at }
            | Event::Tick { at, .. }
            | Event::Notified { at, .. }
            | Event::TimerCompleted { at, .. }
            | Event::RestartScheduled { at, .. }
            | Event::TimerFinished { at }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }

    /// Short tag, matching the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Configured { .. } => "configured",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::Tick { .. } => "tick",
            Event::Notified { .. } => "notified",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::RestartScheduled { .. } => "restart_scheduled",
            Event::TimerFinished { .. } => "timer_finished",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_type_matches_kind() {
        let events = [
            Event::TimerReset { at: Utc::now() },
            Event::Tick {
                elapsed_secs: 3,
                progress: Progress([0.3, 0.6, 0.2]),
                at: Utc::now(),
            },
            Event::TimerFinished { at: Utc::now() },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }

    #[test]
    fn tick_carries_progress_array() {
        let event = Event::Tick {
            elapsed_secs: 5,
            progress: Progress([0.5, 1.0, 0.25]),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["progress"], serde_json::json!([0.5, 1.0, 0.25]));
    }
}
