use clap::{Parser, Subcommand};
use countdown_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "countdown-cli", version, about = "Countdown CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a countdown in the terminal
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Formatting helpers
    Format {
        #[command(subcommand)]
        action: commands::format::FormatAction,
    },
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` wins over the
/// configured level. Never creates the config file.
fn init_tracing() {
    let level = Config::load_or_default()
        .map(|cfg| cfg.log.level)
        .unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("countdown_core={level},countdown_cli={level}")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Format { action } => commands::format::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
