use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::signals::time::format_instant;

/// Seconds until the next signal refresh. Driven by the 1 s clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    interval: u64,
    remaining: u64,
}

impl Countdown {
    pub fn new(interval_secs: u64) -> Self {
        let interval = interval_secs.max(1);
        Self {
            interval,
            remaining: interval,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Advance one second. Returns `true` when a refetch is due, in which
    /// case the counter has already been reset to the full interval.
    pub fn tick(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = self.interval;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }

    pub fn display(&self) -> String {
        format!("Next update in: {}", format_mmss(self.remaining))
    }
}

/// `m:ss`, minutes unpadded.
pub fn format_mmss(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Header clock: current time in the display zone plus the selected country.
pub fn clock_line(now: DateTime<Utc>, zone: Tz, country: &str) -> String {
    format!("{} ({country}, {})", format_instant(now, zone), zone.name())
}
