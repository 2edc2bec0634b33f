use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rolling two-sample status history and episode boundary detection.
///
/// An episode starts implicitly at the first motion-positive frame after a
/// negative (or empty) history and ends at the first negative frame right
/// after a positive one. Only the end transition is reported; a lone first
/// sample can never end an episode.
pub struct EpisodeTracker {
    history: Vec<bool>,
}

impl EpisodeTracker {
    pub fn new() -> Self {
        Self {
            history: Vec::with_capacity(2),
        }
    }

    /// Appends a status sample, keeps the last two, and returns whether an
    /// episode just ended (history reads `[1, 0]`).
    pub fn push(&mut self, motion: bool) -> bool {
        self.history.push(motion);
        if self.history.len() > 2 {
            self.history.remove(0);
        }
        self.history == [true, false]
    }

    /// Whether the most recent sample was motion-positive.
    pub fn active(&self) -> bool {
        self.history.last().copied().unwrap_or(false)
    }
}

impl Default for EpisodeTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats `now` in the IANA timezone named by `tz_name`. An unknown or
/// empty name falls back to UTC; this never fails.
pub fn format_timestamp(tz_name: &str, now: DateTime<Utc>) -> String {
    let tz = Tz::from_str(tz_name).unwrap_or(Tz::UTC);
    now.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}
