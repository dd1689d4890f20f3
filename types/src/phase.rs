//! Season lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AgtError;
use crate::status::Episode;

/// Where a season is in its forward-only lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    /// Created but not yet activated; no windows exist.
    Draft,
    /// Accepting audition submissions.
    AuditionsOpen,
    /// First stage episode.
    Episode1,
    /// Audience voting between the episodes.
    Voting,
    /// Second stage episode.
    Episode2,
    /// Terminal.
    Closed,
}

impl SeasonPhase {
    /// All phases in lifecycle order.
    pub const ORDER: [SeasonPhase; 6] = [
        Self::Draft,
        Self::AuditionsOpen,
        Self::Episode1,
        Self::Voting,
        Self::Episode2,
        Self::Closed,
    ];

    /// Zero-based position in [`SeasonPhase::ORDER`].
    pub fn position(&self) -> usize {
        *self as usize
    }

    /// The following phase, clamped at `Closed`.
    pub fn next(&self) -> SeasonPhase {
        Self::ORDER[(self.position() + 1).min(Self::ORDER.len() - 1)]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// The stage episode this phase hosts, if any.
    pub fn episode(&self) -> Option<Episode> {
        match self {
            Self::Episode1 => Some(Episode::One),
            Self::Episode2 => Some(Episode::Two),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AuditionsOpen => "auditions_open",
            Self::Episode1 => "episode1",
            Self::Voting => "voting",
            Self::Episode2 => "episode2",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonPhase {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "auditions_open" | "auditions" => Ok(Self::AuditionsOpen),
            "episode1" => Ok(Self::Episode1),
            "voting" => Ok(Self::Voting),
            "episode2" => Ok(Self::Episode2),
            "closed" => Ok(Self::Closed),
            _ => Err(AgtError::InvalidPhase(s.to_string())),
        }
    }
}
