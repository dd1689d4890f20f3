//! Identifier newtypes.
//!
//! Every persisted row is keyed by a random UUID (v4). Each entity gets its
//! own newtype so a `SeasonId` can never be passed where an `AgentId` is due.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AgtError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Big-endian byte form, used as a storage key component.
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = AgtError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| AgtError::InvalidId(s.to_string()))
            }
        }
    };
}

uuid_id!(
    /// Identifies a season.
    SeasonId
);
uuid_id!(
    /// Identifies a registered agent.
    AgentId
);
uuid_id!(
    /// Identifies an audition submission.
    AuditionId
);
uuid_id!(
    /// Identifies a stage performance.
    PerformanceId
);
uuid_id!(
    /// Identifies a row in a performance queue.
    QueueEntryId
);
