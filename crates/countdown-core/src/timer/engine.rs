//! Countdown engine implementation.
//!
//! The engine is a tick-driven state machine. It does not own a clock or
//! spawn tasks - the caller delivers one `tick()` per time unit while the
//! engine is running (see [`crate::runtime`] for the tokio driver).
//!
//! ## State Transitions
//!
//! ```text
//!            start                 tick (elapsed >= duration)
//!  Idle ───────────► Running ─────────────────────────────► Completed
//!   ▲                 │   ▲                                     │
//!   │           pause │   │ start (resume)                      │ start / auto-restart
//!   │                 ▼   │                                     │ (fresh run)
//!   │                Paused                                     │
//!   │                                                           │
//!   └──────────── reset (from any state) ◄──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(config);
//! engine.start()?;
//! // Once per time unit:
//! for event in engine.tick() { /* render, notify */ }
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::TimerConfig;
use super::notify::NotificationScheduler;
use super::progress::Progress;
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
        })
    }
}

/// Mutable run state. Only the engine writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub elapsed_secs: u64,
    pub status: TimerStatus,
    pub last_notified_at: Option<u64>,
}

impl TimerState {
    fn idle() -> Self {
        Self {
            elapsed_secs: 0,
            status: TimerStatus::Idle,
            last_notified_at: None,
        }
    }
}

/// Core countdown engine.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    config: TimerConfig,
    state: TimerState,
}

impl CountdownEngine {
    /// Create an engine in the `Idle` state.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: TimerState::idle(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.config.duration_secs().saturating_sub(self.state.elapsed_secs)
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn progress(&self) -> Progress {
        // Duration is positive by construction of TimerConfig.
        Progress::compute(self.state.elapsed_secs, self.config.duration_secs())
            .unwrap_or_default()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.state.status,
            elapsed_secs: self.state.elapsed_secs,
            remaining_secs: self.remaining_secs(),
            progress: self.progress(),
            config: self.config,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh run, or resume a paused one.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` when the countdown is already running.
    pub fn start(&mut self) -> Result<Event, TimerError> {
        self.begin(false)
    }

    /// Start the next run after a completion. Used by the auto-restart
    /// controller; only valid from `Completed`.
    pub fn restart(&mut self) -> Result<Event, TimerError> {
        if self.state.status != TimerStatus::Completed {
            return Err(TimerError::InvalidTransition {
                action: "restart",
                status: self.state.status,
            });
        }
        self.begin(true)
    }

    pub fn pause(&mut self) -> Result<Event, TimerError> {
        match self.state.status {
            TimerStatus::Running => {
                self.state.status = TimerStatus::Paused;
                info!(elapsed = self.state.elapsed_secs, "countdown paused");
                Ok(Event::TimerPaused {
                    elapsed_secs: self.state.elapsed_secs,
                    at: Utc::now(),
                })
            }
            status => Err(TimerError::InvalidTransition {
                action: "pause",
                status,
            }),
        }
    }

    /// Pause when running, otherwise start.
    pub fn toggle(&mut self) -> Result<Event, TimerError> {
        if self.state.status == TimerStatus::Running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Event {
        self.state = TimerState::idle();
        info!("countdown reset");
        Event::TimerReset { at: Utc::now() }
    }

    /// Replace the configuration wholesale.
    ///
    /// A completed run, or a paused run already at or past the new duration,
    /// drops back to `Idle` so that `elapsed <= duration` keeps holding.
    ///
    /// # Errors
    ///
    /// `ConfigLocked` while running.
    pub fn set_config(&mut self, config: TimerConfig) -> Result<Vec<Event>, TimerError> {
        if self.state.status == TimerStatus::Running {
            return Err(TimerError::ConfigLocked);
        }
        self.config = config;
        let mut events = vec![Event::Configured {
            config,
            at: Utc::now(),
        }];

        let stale = match self.state.status {
            TimerStatus::Completed => true,
            TimerStatus::Paused => self.state.elapsed_secs >= config.duration_secs(),
            TimerStatus::Idle | TimerStatus::Running => false,
        };
        if stale {
            events.push(self.reset());
        }
        info!(
            duration = config.duration_secs(),
            interval = %config.notification_interval(),
            auto_restart = config.auto_restart(),
            "countdown configured"
        );
        Ok(events)
    }

    /// Advance by one time unit. Returns nothing unless running.
    ///
    /// On the completion tick the notification scheduler is not consulted:
    /// completion takes precedence over a coinciding interval boundary.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.state.status != TimerStatus::Running {
            return Vec::new();
        }

        let duration = self.config.duration_secs();
        self.state.elapsed_secs = (self.state.elapsed_secs + 1).min(duration);
        let elapsed = self.state.elapsed_secs;
        let now = Utc::now();
        let mut events = Vec::with_capacity(2);

        if elapsed >= duration {
            self.state.status = TimerStatus::Completed;
            info!(elapsed, "countdown completed");
            events.push(Event::TimerCompleted {
                elapsed_secs: elapsed,
                at: now,
            });
        } else {
            let scheduler = NotificationScheduler::new(self.config.notification_interval());
            if let Some(notification) = scheduler.check(elapsed, self.state.last_notified_at) {
                self.state.last_notified_at = Some(notification.notified_at());
                debug!(elapsed, "interval notification");
                events.push(Event::Notified {
                    minutes_elapsed: notification.minutes_elapsed(),
                    elapsed_secs: elapsed,
                    at: now,
                });
            }
        }

        events.push(Event::Tick {
            elapsed_secs: elapsed,
            progress: self.progress(),
            at: now,
        });
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, auto_restarted: bool) -> Result<Event, TimerError> {
        let resumed = match self.state.status {
            TimerStatus::Running => return Err(TimerError::AlreadyActive),
            TimerStatus::Paused => true,
            TimerStatus::Idle | TimerStatus::Completed => {
                self.state.elapsed_secs = 0;
                self.state.last_notified_at = None;
                false
            }
        };
        self.state.status = TimerStatus::Running;
        info!(
            elapsed = self.state.elapsed_secs,
            resumed, auto_restarted, "countdown started"
        );
        Ok(Event::TimerStarted {
            elapsed_secs: self.state.elapsed_secs,
            duration_secs: self.config.duration_secs(),
            resumed,
            auto_restarted,
            at: Utc::now(),
        })
    }
}
