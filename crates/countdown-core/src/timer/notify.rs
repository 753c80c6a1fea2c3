//! Interval reminders.
//!
//! A reminder fires once per multiple of the interval. The last fired
//! elapsed value is kept by the engine and handed back on every check, so a
//! redelivered tick for the same second never fires twice.

use super::config::{IntervalSetting, NotificationInterval};
use crate::error::TimerError;

/// A reminder that should be delivered this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub elapsed_secs: u64,
}

impl Notification {
    /// Whole minutes elapsed, as reported to observers.
    pub fn minutes_elapsed(&self) -> u64 {
        self.elapsed_secs / 60
    }

    /// Value to persist as the last notified second.
    pub fn notified_at(&self) -> u64 {
        self.elapsed_secs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationScheduler {
    interval: NotificationInterval,
}

impl NotificationScheduler {
    pub fn new(interval: NotificationInterval) -> Self {
        Self { interval }
    }

    /// Build from raw input, rejecting non-positive intervals.
    pub fn from_setting(setting: IntervalSetting) -> Result<Self, TimerError> {
        NotificationInterval::from_setting(setting).map(Self::new)
    }

    pub fn check(&self, elapsed_secs: u64, last_notified_at: Option<u64>) -> Option<Notification> {
        let interval = self.interval.as_secs()?;
        if elapsed_secs == 0 || elapsed_secs % interval != 0 {
            return None;
        }
        if last_notified_at == Some(elapsed_secs) {
            return None;
        }
        Some(Notification { elapsed_secs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn every(secs: i64) -> NotificationScheduler {
        NotificationScheduler::from_setting(IntervalSetting::Seconds(secs)).unwrap()
    }

    #[test]
    fn fires_on_multiples_only() {
        let s = every(4);
        let fired: Vec<u64> = (0..=12)
            .filter_map(|e| s.check(e, None))
            .map(|n| n.elapsed_secs)
            .collect();
        assert_eq!(fired, vec![4, 8, 12]);
    }

    #[test]
    fn never_fires_at_zero() {
        assert_eq!(every(1).check(0, None), None);
    }

    #[test]
    fn redelivered_second_does_not_fire_twice() {
        let s = every(5);
        let first = s.check(10, Some(5)).unwrap();
        assert_eq!(s.check(10, Some(first.notified_at())), None);
    }

    #[test]
    fn disabled_never_fires() {
        let s = NotificationScheduler::new(NotificationInterval::Disabled);
        assert!((0..500).all(|e| s.check(e, None).is_none()));
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        assert_eq!(
            NotificationScheduler::from_setting(IntervalSetting::Seconds(0)),
            Err(TimerError::InvalidInterval(0))
        );
        assert_eq!(
            NotificationScheduler::from_setting(IntervalSetting::Seconds(-60)),
            Err(TimerError::InvalidInterval(-60))
        );
    }

    #[test]
    fn reports_whole_minutes() {
        let n = every(90).check(180, None).unwrap();
        assert_eq!(n.minutes_elapsed(), 3);
        let n = every(4).check(8, None).unwrap();
        assert_eq!(n.minutes_elapsed(), 0);
    }

    proptest! {
        #[test]
        fn fires_exactly_once_per_multiple(interval in 1i64..50, ticks in 1u64..500) {
            let s = every(interval);
            let mut last = None;
            let mut fired = 0u64;
            for elapsed in 1..=ticks {
                // Deliver every tick twice.
                for _ in 0..2 {
                    if let Some(n) = s.check(elapsed, last) {
                        last = Some(n.notified_at());
                        fired += 1;
                    }
                }
            }
            prop_assert_eq!(fired, ticks / interval as u64);
        }
    }
}
