//! Scaled progress trackers.
//!
//! A tracker maps elapsed time onto `[0, 1]` against `duration * scale`.
//! A scale below 1 fills before the countdown ends; a scale above 1 never
//! fills within the run.

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Compute a tracker value.
///
/// # Errors
///
/// `InvalidDuration` for a zero duration, `InvalidScale` for a scale that is
/// not positive and finite.
pub fn value(elapsed_secs: u64, duration_secs: u64, scale: f64) -> Result<f64, TimerError> {
    if duration_secs == 0 {
        return Err(TimerError::InvalidDuration(0));
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(TimerError::InvalidScale(scale));
    }
    let span = duration_secs as f64 * scale;
    Ok((elapsed_secs as f64 / span).min(1.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTracker {
    scale: f64,
}

impl ProgressTracker {
    /// Matches the countdown duration.
    pub const MAIN: ProgressTracker = ProgressTracker { scale: 1.0 };
    /// Completes at half the duration.
    pub const FAST: ProgressTracker = ProgressTracker { scale: 0.5 };
    /// Stays below 1.0 for the whole run.
    pub const SLOW: ProgressTracker = ProgressTracker { scale: 1.5 };

    /// The fixed trackers, in the order their values appear in [`Progress`].
    pub const ALL: [ProgressTracker; 3] = [Self::MAIN, Self::FAST, Self::SLOW];

    pub fn new(scale: f64) -> Result<Self, TimerError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TimerError::InvalidScale(scale));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn value(&self, elapsed_secs: u64, duration_secs: u64) -> Result<f64, TimerError> {
        value(elapsed_secs, duration_secs, self.scale)
    }
}

/// Values of the three fixed trackers at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress(pub [f64; 3]);

impl Progress {
    /// Evaluate every fixed tracker.
    pub fn compute(elapsed_secs: u64, duration_secs: u64) -> Result<Self, TimerError> {
        let mut values = [0.0; 3];
        for (slot, tracker) in values.iter_mut().zip(ProgressTracker::ALL) {
            *slot = tracker.value(elapsed_secs, duration_secs)?;
        }
        Ok(Progress(values))
    }

    pub fn main(&self) -> f64 {
        self.0[0]
    }

    pub fn fast(&self) -> f64 {
        self.0[1]
    }

    pub fn slow(&self) -> f64 {
        self.0[2]
    }
}
