//! Reference instants.
//!
//! All cutoff arithmetic works on zone-less `NaiveDateTime` values. The wall
//! clock only decides which zone "now" is read in, to match how the bucket
//! directories were named.

use chrono::{Local, NaiveDateTime, Timelike, Utc};

/// Which wall clock supplies "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallClock {
    /// The host's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl WallClock {
    /// Current time on this clock, truncated to whole seconds.
    pub fn now(self) -> NaiveDateTime {
        let now = match self {
            Self::Local => Local::now().naive_local(),
            Self::Utc => Utc::now().naive_utc(),
        };
        now.with_nanosecond(0).unwrap_or(now)
    }
}
