//! Tokio driver for the countdown engine.
//!
//! [`TimerRuntime`] is a single task that owns the engine, the clock and the
//! auto-restart controller. Caller commands, clock pulses and restart
//! wake-ups are taken one at a time from a `select!` loop and each is
//! processed to completion, so observers never see a half-applied tick.
//! Callers talk to it through a cloneable [`TimerHandle`].

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::TimerError;
use crate::events::Event;
use crate::timer::{
    AutoRestartController, Clock, CountdownEngine, IntervalSetting, Pulse, RestartDecision,
    RestartDue, TimerConfig, TimerStatus, DEFAULT_RESTART_DELAY, DEFAULT_TICK,
};

const EVENT_BUFFER: usize = 256;

/// Timing parameters for the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Length of one time unit.
    pub tick: Duration,
    /// Cooldown between completion and an automatic restart.
    pub restart_delay: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, TimerError>>;

#[derive(Debug)]
enum Command {
    Configure(TimerConfig, Reply<()>),
    Start(Reply<()>),
    Pause(Reply<()>),
    Toggle(Reply<()>),
    Reset(Reply<()>),
    Snapshot(Reply<Event>),
    Shutdown,
}

/// Owns the countdown state. Spawn [`TimerRuntime::run`] on a tokio runtime.
pub struct TimerRuntime {
    engine: CountdownEngine,
    clock: Clock,
    restart: AutoRestartController,
    commands: mpsc::Receiver<Command>,
    pulse_tx: mpsc::UnboundedSender<Pulse>,
    pulses: mpsc::UnboundedReceiver<Pulse>,
    restart_tx: mpsc::UnboundedSender<RestartDue>,
    restarts: mpsc::UnboundedReceiver<RestartDue>,
    events: broadcast::Sender<Event>,
}

/// Caller-facing handle to a running [`TimerRuntime`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl TimerRuntime {
    pub fn new(config: TimerConfig, options: RuntimeOptions) -> (Self, TimerHandle) {
        let (command_tx, commands) = mpsc::channel(32);
        let (pulse_tx, pulses) = mpsc::unbounded_channel();
        let (restart_tx, restarts) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let runtime = Self {
            engine: CountdownEngine::new(config),
            clock: Clock::new(options.tick),
            restart: AutoRestartController::new(options.restart_delay),
            commands,
            pulse_tx,
            pulses,
            restart_tx,
            restarts,
            events: events.clone(),
        };
        let handle = TimerHandle {
            commands: command_tx,
            events,
        };
        (runtime, handle)
    }

    /// Process commands and timer wake-ups until shut down or every handle
    /// is dropped.
    pub async fn run(mut self) {
        info!(
            duration = self.engine.config().duration_secs(),
            "timer runtime started"
        );
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(pulse) = self.pulses.recv() => self.handle_pulse(pulse),
                Some(due) = self.restarts.recv() => self.handle_restart(due),
            }
        }
        self.clock.stop();
        self.restart.cancel();
        info!("timer runtime stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Configure(config, reply) => {
                let result = self.engine.set_config(config).map(|events| {
                    self.restart.cancel();
                    self.publish_all(events);
                });
                let _ = reply.send(result);
            }
            Command::Start(reply) => {
                let result = self.engine.start().map(|event| self.activate(event));
                let _ = reply.send(result);
            }
            Command::Pause(reply) => {
                let result = self.engine.pause().map(|event| {
                    self.clock.stop();
                    self.publish(event);
                });
                let _ = reply.send(result);
            }
            Command::Toggle(reply) => {
                let was_running = self.engine.status() == TimerStatus::Running;
                let result = self.engine.toggle().map(|event| {
                    if was_running {
                        self.clock.stop();
                        self.publish(event);
                    } else {
                        self.activate(event);
                    }
                });
                let _ = reply.send(result);
            }
            Command::Reset(reply) => {
                self.clock.stop();
                self.restart.cancel();
                let event = self.engine.reset();
                self.publish(event);
                let _ = reply.send(Ok(()));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(Ok(self.engine.snapshot()));
            }
            Command::Shutdown => {}
        }
    }

    fn handle_pulse(&mut self, pulse: Pulse) {
        if !self.clock.accepts(&pulse) {
            debug!(epoch = pulse.epoch, "dropping stale pulse");
            return;
        }
        let events = self.engine.tick();
        let completed = events
            .iter()
            .any(|e| matches!(e, Event::TimerCompleted { .. }));
        self.publish_all(events);

        if completed {
            self.clock.stop();
            let config = *self.engine.config();
            match self.restart.on_completed(&config, self.restart_tx.clone()) {
                RestartDecision::Scheduled { delay } => self.publish(Event::RestartScheduled {
                    delay_ms: delay.as_millis() as u64,
                    at: Utc::now(),
                }),
                RestartDecision::Finished => self.publish(Event::TimerFinished { at: Utc::now() }),
            }
        }
    }

    fn handle_restart(&mut self, due: RestartDue) {
        if !self.restart.take_due(due) {
            return;
        }
        match self.engine.restart() {
            Ok(event) => self.activate(event),
            Err(e) => warn!(error = %e, "auto-restart skipped"),
        }
    }

    /// Publish a start event and bring the clock up.
    fn activate(&mut self, event: Event) {
        // A manual start supersedes any pending automatic one.
        self.restart.cancel();
        self.clock.stop();
        if let Err(e) = self.clock.start(self.pulse_tx.clone()) {
            warn!(error = %e, "clock failed to start");
        }
        self.publish(event);
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn publish_all(&self, events: Vec<Event>) {
        for event in events {
            self.publish(event);
        }
    }
}

impl TimerHandle {
    /// Subscribe to engine events. Only events sent after this call are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Validate and apply a new configuration.
    ///
    /// # Errors
    ///
    /// `InvalidDuration` / `InvalidInterval` for bad input, `ConfigLocked`
    /// while running.
    pub async fn configure(
        &self,
        duration_secs: i64,
        interval: IntervalSetting,
        auto_restart: bool,
    ) -> Result<(), TimerError> {
        let config = TimerConfig::new(duration_secs, interval, auto_restart)?;
        self.set_config(config).await
    }

    pub async fn set_config(&self, config: TimerConfig) -> Result<(), TimerError> {
        self.request(|reply| Command::Configure(config, reply)).await
    }

    pub async fn start(&self) -> Result<(), TimerError> {
        self.request(Command::Start).await
    }

    pub async fn pause(&self) -> Result<(), TimerError> {
        self.request(Command::Pause).await
    }

    pub async fn toggle(&self) -> Result<(), TimerError> {
        self.request(Command::Toggle).await
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.request(Command::Reset).await
    }

    /// Current state as a `StateSnapshot` event.
    pub async fn snapshot(&self) -> Result<Event, TimerError> {
        self.request(Command::Snapshot).await
    }

    /// Ask the runtime to stop. Pending timers are cancelled.
    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| TimerError::RuntimeStopped)
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, TimerError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| TimerError::RuntimeStopped)?;
        rx.await.map_err(|_| TimerError::RuntimeStopped)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, Instant};

    fn spawn(config: TimerConfig) -> TimerHandle {
        let (runtime, handle) = TimerRuntime::new(config, RuntimeOptions::default());
        tokio::spawn(runtime.run());
        handle
    }

    async fn elapsed_of(handle: &TimerHandle) -> (TimerStatus, u64) {
        match handle.snapshot().await.unwrap() {
            Event::StateSnapshot {
                status,
                elapsed_secs,
                ..
            } => (status, elapsed_secs),
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_unit() {
        let config = TimerConfig::new(10, IntervalSetting::Disabled, false).unwrap();
        let handle = spawn(config);
        handle.start().await.unwrap();

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(elapsed_of(&handle).await, (TimerStatus::Running, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticks() {
        let config = TimerConfig::new(10, IntervalSetting::Disabled, false).unwrap();
        let handle = spawn(config);
        handle.start().await.unwrap();
        time::sleep(Duration::from_millis(2500)).await;
        handle.pause().await.unwrap();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(elapsed_of(&handle).await, (TimerStatus::Paused, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_reported_to_the_caller() {
        let config = TimerConfig::new(10, IntervalSetting::Disabled, false).unwrap();
        let handle = spawn(config);

        assert!(matches!(
            handle.pause().await,
            Err(TimerError::InvalidTransition { .. })
        ));
        handle.start().await.unwrap();
        assert_eq!(handle.start().await, Err(TimerError::AlreadyActive));
        assert_eq!(
            handle.configure(5, IntervalSetting::Disabled, false).await,
            Err(TimerError::ConfigLocked)
        );
        assert_eq!(
            handle.configure(0, IntervalSetting::Disabled, false).await,
            Err(TimerError::InvalidDuration(0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn handle_reports_stopped_runtime() {
        let handle = spawn(TimerConfig::default());
        handle.shutdown().await.unwrap();
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.start().await, Err(TimerError::RuntimeStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn auto_restart_begins_fresh_run_after_delay() {
        let config = TimerConfig::new(5, IntervalSetting::Disabled, true).unwrap();
        let handle = spawn(config);
        let mut events = handle.subscribe();
        let begun = Instant::now();
        handle.start().await.unwrap();

        loop {
            if let Event::TimerStarted { auto_restarted: true, elapsed_secs, .. } =
                events.recv().await.unwrap()
            {
                assert_eq!(elapsed_secs, 0);
                break;
            }
        }
        assert_eq!(begun.elapsed(), Duration::from_secs(6));
    }
}
