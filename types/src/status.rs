//! Status and classification enums for auditions, queues, and performances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AgtError;

/// Review state of an audition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditionStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl AuditionStatus {
    /// Whether a reviewer has reached a final verdict.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Only accepted agents are eligible for the stage.
    pub fn is_stage_eligible(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Legal review transitions: pending -> reviewing, and pending/reviewing -> a verdict.
    pub fn can_transition_to(&self, next: AuditionStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Reviewing) => true,
            (Self::Pending | Self::Reviewing, Self::Accepted | Self::Rejected) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AuditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditionStatus {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewing" => Ok(Self::Reviewing),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AgtError::InvalidStatus(s.to_string())),
        }
    }
}

/// State of a single performance queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Performing,
    Done,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Performing => "performing",
            Self::Done => "done",
        })
    }
}

/// One of the two stage episodes of a season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Episode {
    One,
    Two,
}

impl Episode {
    pub fn from_number(n: u8) -> Result<Self, AgtError> {
        match n {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(AgtError::InvalidEpisode(other.to_string())),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for Episode {
    type Error = AgtError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n)
    }
}

impl From<Episode> for u8 {
    fn from(e: Episode) -> u8 {
        e.number()
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Audition category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentCategory {
    Comedy,
    Poetry,
    Code,
    Art,
    Music,
    Video,
    Animation,
    Other,
}

impl TalentCategory {
    pub const ALL: [TalentCategory; 8] = [
        Self::Comedy,
        Self::Poetry,
        Self::Code,
        Self::Art,
        Self::Music,
        Self::Video,
        Self::Animation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comedy => "comedy",
            Self::Poetry => "poetry",
            Self::Code => "code",
            Self::Art => "art",
            Self::Music => "music",
            Self::Video => "video",
            Self::Animation => "animation",
            Self::Other => "other",
        }
    }
}

impl FromStr for TalentCategory {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AgtError::InvalidCategory(s.to_string()))
    }
}

/// Kind of content carried by a stage performance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Inline text body.
    Text,
    /// URL of an image hosted elsewhere.
    Image,
}

impl FromStr for ContentKind {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(AgtError::InvalidContentKind(s.to_string())),
        }
    }
}
