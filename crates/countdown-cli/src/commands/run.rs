use std::time::Duration;

use clap::Args;
use countdown_core::{
    format_elapsed, Config, Event, IntervalSetting, TimerConfig, TimerHandle, TimerRuntime,
    WallClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

#[derive(Args)]
pub struct RunArgs {
    /// Countdown length in seconds (defaults to timer.duration_secs)
    #[arg(long, allow_hyphen_values = true)]
    duration: Option<i64>,
    /// Reminder interval in seconds, or "disabled"
    #[arg(long, allow_hyphen_values = true)]
    interval: Option<IntervalSetting>,
    /// Restart automatically after each completion
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    auto_restart: Option<bool>,
    /// Length of one tick in milliseconds (defaults to runtime.tick_ms)
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Do not read commands from stdin
    #[arg(long)]
    no_input: bool,
}

/// Interactive commands read from stdin, one per line.
#[derive(Debug, PartialEq, Eq)]
enum InputCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Status,
    Quit,
}

impl InputCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "s" | "start" | "resume" => Some(Self::Start),
            "p" | "pause" => Some(Self::Pause),
            "" | "t" | "toggle" => Some(Self::Toggle),
            "r" | "reset" => Some(Self::Reset),
            "?" | "status" => Some(Self::Status),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Flags win over the file; only the merged values are validated.
fn timer_config(args: &RunArgs, file: &Config) -> Result<TimerConfig, Box<dyn std::error::Error>> {
    let timer = &file.timer;
    let interval = args.interval.unwrap_or(match timer.notification_interval.as_secs() {
        None => IntervalSetting::Disabled,
        Some(secs) => IntervalSetting::Seconds(i64::try_from(secs).unwrap_or(i64::MAX)),
    });
    let config = TimerConfig::new(
        args.duration.unwrap_or(timer.duration_secs),
        interval,
        args.auto_restart.unwrap_or(timer.auto_restart),
    )?;
    Ok(config)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = Config::load()?;
    let config = timer_config(&args, &file)?;
    let mut options = file.runtime_options();
    if let Some(ms) = args.tick_ms {
        options.tick = Duration::from_millis(ms.max(1));
        options.restart_delay = options.tick;
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(async move {
        let (runtime, handle) = TimerRuntime::new(config, options);
        let runtime_task = tokio::spawn(runtime.run());
        let result = drive(&handle, &args, options.tick).await;
        let _ = handle.shutdown().await;
        let _ = runtime_task.await;
        result
    });
    // A pending stdin read cannot be cancelled; don't wait for it.
    rt.shutdown_background();
    result
}

async fn drive(
    handle: &TimerHandle,
    args: &RunArgs,
    tick: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = handle.subscribe();
    let wall_clock = WallClock::spawn(tick);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = !args.no_input;
    let mut duration = 0;

    handle.start().await?;
    if !args.json && input_open {
        eprintln!("commands: [s]tart [p]ause [t]oggle [r]eset [?]status [q]uit");
    }

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if let Event::TimerStarted { duration_secs, .. } = &event {
                        duration = *duration_secs;
                    }
                    print_event(&event, args.json, &wall_clock.current(), duration)?;
                    if matches!(event, Event::TimerFinished { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "display fell behind"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if input_open => match line? {
                Some(line) => match InputCommand::parse(&line) {
                    Some(InputCommand::Quit) => break,
                    Some(command) => {
                        if let Err(e) = apply(handle, command).await {
                            eprintln!("error: {e}");
                        }
                    }
                    None => eprintln!("unknown command: {}", line.trim()),
                },
                None => {
                    debug!("stdin closed");
                    input_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }
    }
    wall_clock.stop();
    Ok(())
}

async fn apply(
    handle: &TimerHandle,
    command: InputCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        InputCommand::Start => handle.start().await?,
        InputCommand::Pause => handle.pause().await?,
        InputCommand::Toggle => handle.toggle().await?,
        InputCommand::Reset => handle.reset().await?,
        InputCommand::Status => {
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        InputCommand::Quit => {}
    }
    Ok(())
}

fn print_event(
    event: &Event,
    json: bool,
    wall: &str,
    duration: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::Tick {
            elapsed_secs,
            progress,
            ..
        } => println!(
            "[{wall}] {} / {}  main {:>3.0}%  fast {:>3.0}%  slow {:>3.0}%",
            format_elapsed(*elapsed_secs),
            format_elapsed(duration),
            progress.main() * 100.0,
            progress.fast() * 100.0,
            progress.slow() * 100.0,
        ),
        Event::Notified {
            minutes_elapsed, ..
        } => println!("[{wall}] reminder: {minutes_elapsed} min elapsed"),
        Event::TimerStarted {
            resumed,
            auto_restarted,
            ..
        } => {
            let how = match (*resumed, *auto_restarted) {
                (true, _) => "resumed",
                (false, true) => "restarted",
                (false, false) => "started",
            };
            println!("[{wall}] {how}");
        }
        Event::TimerPaused { elapsed_secs, .. } => {
            println!("[{wall}] paused at {}", format_elapsed(*elapsed_secs))
        }
        Event::TimerReset { .. } => println!("[{wall}] reset"),
        Event::TimerCompleted { .. } => println!("[{wall}] completed"),
        Event::RestartScheduled { delay_ms, .. } => {
            println!("[{wall}] restarting in {delay_ms} ms")
        }
        Event::TimerFinished { .. } => println!("[{wall}] timer finished"),
        Event::Configured { .. } | Event::StateSnapshot { .. } => {}
    }
    Ok(())
}
