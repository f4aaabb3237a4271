//! Quiet-hours window: a `[start, end)` time-of-day range that may wrap past midnight.

use chrono::{DateTime, NaiveTime, TimeZone};

/// Check whether `now` falls inside the quiet period `[start, end)`.
///
/// The time-of-day is read in `now`'s own timezone. When `start >= end` the
/// window crosses midnight (e.g. 19:00–08:00), and `start == end` covers the
/// whole day.
pub fn is_quiet<Tz: TimeZone>(now: &DateTime<Tz>, start: NaiveTime, end: NaiveTime) -> bool {
    let t = now.time();

    if start < end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

/// The configured quiet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QuietWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        is_quiet(now, self.start, self.end)
    }

    pub fn crosses_midnight(&self) -> bool {
        self.start >= self.end
    }
}

/// Parse "HH:MM" or "HH:MM:SS".
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .ok()
}
