//! Independent wall-clock display updater.
//!
//! Publishes the formatted local time once per period on a `watch` channel.
//! It shares nothing with the countdown [`Clock`](crate::timer::Clock):
//! the two sources drift freely and stopping one never touches the other.

use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::format::format_wall_clock;

pub struct WallClock {
    rx: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl WallClock {
    /// Spawn the updater. The current time is available immediately.
    pub fn spawn(period: Duration) -> Self {
        Self::spawn_with(period, || format_wall_clock(&Local::now()))
    }

    /// Spawn with a custom time source.
    pub fn spawn_with<F>(period: Duration, mut now: F) -> Self
    where
        F: FnMut() -> String + Send + 'static,
    {
        let (tx, rx) = watch::channel(now());
        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the initial value is
            // already published.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(now()).is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }

    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for WallClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}
