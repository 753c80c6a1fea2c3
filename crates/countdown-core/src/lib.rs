//! # Countdown Core Library
//!
//! This library provides the core logic for the Countdown timer: a
//! countdown engine with scaled progress trackers, interval reminders and
//! optional auto-restart. The CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine; it owns no clock and
//!   must be fed one `tick()` per time unit
//! - **Runtime**: A tokio actor wiring the clock, the auto-restart delay and
//!   caller commands into the engine, one event at a time
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core state machine
//! - [`TimerRuntime`] / [`TimerHandle`]: Async driver and its caller API
//! - [`Event`]: Everything observers receive
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod runtime;
pub mod storage;
pub mod timer;
pub mod wall_clock;

pub use error::{ConfigError, CoreError, TimerError};
pub use events::Event;
pub use format::{format_elapsed, format_wall_clock};
pub use runtime::{RuntimeOptions, TimerHandle, TimerRuntime};
pub use storage::Config;
pub use timer::{
    CountdownEngine, IntervalSetting, NotificationInterval, Progress, ProgressTracker, TimerConfig,
    TimerState, TimerStatus,
};
pub use wall_clock::WallClock;
