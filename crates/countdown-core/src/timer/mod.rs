mod clock;
mod config;
mod engine;
mod notify;
mod progress;
mod restart;

pub use clock::{Clock, Pulse, DEFAULT_TICK};
pub use config::{IntervalSetting, NotificationInterval, TimerConfig};
pub use engine::{CountdownEngine, TimerState, TimerStatus};
pub use notify::{Notification, NotificationScheduler};
pub use progress::{value as progress_value, Progress, ProgressTracker};
pub use restart::{AutoRestartController, RestartDecision, RestartDue, DEFAULT_RESTART_DELAY};
