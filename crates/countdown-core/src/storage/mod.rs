mod config;

pub use config::{Config, LogSection, RuntimeSection, TimerSection};

use std::path::PathBuf;

/// Path of `~/.config/countdown[-dev]/` based on COUNTDOWN_ENV, without
/// touching the filesystem.
///
/// Set COUNTDOWN_ENV=dev to use development data directory.
pub fn data_dir_path() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("COUNTDOWN_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("countdown-dev")
    } else {
        base_dir.join("countdown")
    }
}

/// Returns `~/.config/countdown[-dev]/`, creating it if needed.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
