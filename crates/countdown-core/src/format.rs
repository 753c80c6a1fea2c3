//! Display formatting for elapsed time and the wall clock.

use chrono::{DateTime, TimeZone};

/// Wall-clock layout: `DD.MM.YYYY HH:MM:SS`.
pub const WALL_CLOCK_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Format seconds as `MM:SS`. Minutes widen past two digits instead of
/// wrapping into hours.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_wall_clock<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.format(WALL_CLOCK_FORMAT).to_string()
}
