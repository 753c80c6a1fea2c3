use chrono::Local;
use clap::Subcommand;
use countdown_core::{format_elapsed, format_wall_clock};

#[derive(Subcommand)]
pub enum FormatAction {
    /// Format a number of seconds as MM:SS
    Elapsed {
        seconds: u64,
    },
    /// Print the current local time as DD.MM.YYYY HH:MM:SS
    Now,
}

pub fn run(action: FormatAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FormatAction::Elapsed { seconds } => println!("{}", format_elapsed(seconds)),
        FormatAction::Now => println!("{}", format_wall_clock(&Local::now())),
    }
    Ok(())
}
