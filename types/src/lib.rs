//! Fundamental types for the Agent Got Talent arena.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! wallet addresses, identifiers, timestamps and clocks, season phases, status enums,
//! roles, arena parameters, and the failure taxonomy every error maps onto.

pub mod address;
pub mod error;
pub mod ids;
pub mod keys;
pub mod params;
pub mod phase;
pub mod role;
pub mod status;
pub mod time;
pub mod window;

pub use address::WalletAddress;
pub use error::{AgtError, ErrorCode, FailureClass};
pub use ids::{AgentId, AuditionId, PerformanceId, QueueEntryId, SeasonId};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use params::ArenaParams;
pub use phase::SeasonPhase;
pub use role::Role;
pub use status::{AuditionStatus, ContentKind, Episode, QueueStatus, TalentCategory};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
pub use window::{SeasonDurations, SeasonWindows, Window};
