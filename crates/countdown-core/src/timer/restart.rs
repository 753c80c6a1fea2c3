//! Auto-restart after completion.
//!
//! On completion the controller either arms a one-shot delay (auto-restart
//! on) or reports that the run is finished. A pending restart is identified
//! by an epoch; cancelling retires the epoch so a wake-up that was already
//! sent is ignored by [`AutoRestartController::take_due`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::config::TimerConfig;

/// Default cooldown before a restarted run begins.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(1);

/// Wake-up sent when a restart delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartDue {
    pub epoch: u64,
}

/// What to do about a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    Scheduled { delay: Duration },
    Finished,
}

#[derive(Debug)]
pub struct AutoRestartController {
    delay: Duration,
    epoch: u64,
    pending: Option<JoinHandle<()>>,
}

impl AutoRestartController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            epoch: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// React to a completion under `config`. Must be called from within a
    /// tokio runtime when auto-restart is enabled.
    pub fn on_completed(
        &mut self,
        config: &TimerConfig,
        sink: mpsc::UnboundedSender<RestartDue>,
    ) -> RestartDecision {
        if !config.auto_restart() {
            return RestartDecision::Finished;
        }
        self.cancel();
        self.epoch += 1;
        let epoch = self.epoch;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sink.send(RestartDue { epoch });
        }));
        debug!(epoch, delay_ms = delay.as_millis() as u64, "restart scheduled");
        RestartDecision::Scheduled { delay }
    }

    /// Claim a wake-up. Returns `false` for one that was cancelled.
    pub fn take_due(&mut self, due: RestartDue) -> bool {
        if self.pending.is_none() || due.epoch != self.epoch {
            debug!(epoch = due.epoch, "ignoring stale restart");
            return false;
        }
        self.pending = None;
        true
    }

    /// Drop any pending restart. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
            self.epoch += 1;
            debug!("pending restart cancelled");
        }
    }
}

impl Default for AutoRestartController {
    fn default() -> Self {
        Self::new(DEFAULT_RESTART_DELAY)
    }
}

impl Drop for AutoRestartController {
    fn drop(&mut self) {
        self.cancel();
    }
}
