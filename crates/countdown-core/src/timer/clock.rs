//! Periodic pulse source.
//!
//! Each activation gets a fresh epoch. Pulses carry the epoch they were
//! produced under, and [`Clock::accepts`] rejects any pulse from a retired
//! epoch, so a pulse already queued when `stop()` runs is never observed.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::TimerError;

/// Default cadence: one second.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// One clock pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub epoch: u64,
}

#[derive(Debug)]
pub struct Clock {
    period: Duration,
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            epoch: 0,
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Begin pulsing into `sink`. The first pulse arrives one period after
    /// activation. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` if the clock was started and not stopped since.
    pub fn start(&mut self, sink: mpsc::UnboundedSender<Pulse>) -> Result<(), TimerError> {
        if self.task.is_some() {
            return Err(TimerError::AlreadyActive);
        }
        self.epoch += 1;
        let epoch = self.epoch;
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sink.send(Pulse { epoch }).is_err() {
                    break;
                }
            }
        }));
        debug!(epoch, period_ms = period.as_millis() as u64, "clock started");
        Ok(())
    }

    /// Stop pulsing. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Retire the epoch so queued pulses are rejected.
            self.epoch += 1;
            debug!(epoch = self.epoch, "clock stopped");
        }
    }

    /// Whether `pulse` belongs to the current activation.
    pub fn accepts(&self, pulse: &Pulse) -> bool {
        self.task.is_some() && pulse.epoch == self.epoch
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_pulse_after_one_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clock = Clock::new(Duration::from_secs(1));
        let started = Instant::now();
        clock.start(tx).unwrap();

        let pulse = rx.recv().await.unwrap();
        assert!(clock.accepts(&pulse));
        assert_eq!(started.elapsed(), Duration::from_secs(1));

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_already_active() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut clock = Clock::default();
        clock.start(tx.clone()).unwrap();
        assert_eq!(clock.start(tx), Err(TimerError::AlreadyActive));
        clock.stop();
        assert!(!clock.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn queued_pulse_rejected_after_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clock = Clock::new(Duration::from_secs(1));
        clock.start(tx.clone()).unwrap();

        time::sleep(Duration::from_millis(1500)).await;
        clock.stop();

        let late = rx.recv().await.unwrap();
        assert!(!clock.accepts(&late));

        // A new activation does not revive pulses from the old one.
        clock.start(tx).unwrap();
        assert!(!clock.accepts(&late));
        let fresh = rx.recv().await.unwrap();
        assert!(clock.accepts(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut clock = Clock::default();
        clock.stop();
        clock.stop();
        assert!(!clock.is_active());
    }
}
