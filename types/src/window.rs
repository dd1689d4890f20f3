//! Time windows fixed at season activation.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A closed interval `[start, end]` of wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Window {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Window of `secs` length beginning at `start`.
    pub fn starting_at(start: Timestamp, secs: u64) -> Self {
        Self {
            start,
            end: start.plus_secs(secs),
        }
    }

    /// Whether `t` falls inside the window, boundaries included.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn duration_secs(&self) -> u64 {
        self.end.as_secs().saturating_sub(self.start.as_secs())
    }
}

/// The three windows of an activated season. Never recomputed after activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindows {
    pub auditions: Window,
    pub episode1: Window,
    pub episode2: Window,
}

/// Phase durations, in days, requested at activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDurations {
    pub auditions_days: u32,
    pub voting_days: u32,
    pub episode2_days: u32,
}

impl SeasonDurations {
    /// Every duration must be at least one day.
    pub fn is_valid(&self) -> bool {
        self.auditions_days > 0 && self.voting_days > 0 && self.episode2_days > 0
    }
}

impl Default for SeasonDurations {
    fn default() -> Self {
        Self {
            auditions_days: 2,
            voting_days: 3,
            episode2_days: 2,
        }
    }
}
