//! Auto-refresh schedule. The host drives time by polling; the engine owns
//! no timers.

use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct RefreshSchedule {
    interval: Option<Duration>,
    last: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|d| !d.is_zero()),
            last: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// `None` (or a zero interval) disables. Restarts the period.
    pub fn set_interval(&mut self, interval: Option<Duration>) {
        self.interval = interval.filter(|d| !d.is_zero());
        self.last = None;
    }

    /// True when a refresh is due at `now`; the period restarts from `now`.
    /// The first poll only starts the clock.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };
        match self.last {
            None => {
                self.last = Some(now);
                false
            }
            Some(last) if now.saturating_duration_since(last) >= interval => {
                self.last = Some(now);
                true
            }
            Some(_) => false,
        }
    }
}
