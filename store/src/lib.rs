//! Abstract storage traits for the arena.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The services depend only on the traits, never on a backend.
//!
//! Operations that must be atomic per key are single trait methods
//! (`take_challenge`, `replace_queue`, `advance_stage`, `replace_season_if`,
//! the upserts); a backend must run each of them as one transaction.

pub mod admin;
pub mod agent;
pub mod audition;
pub mod challenge;
pub mod error;
pub mod judge;
pub mod performance;
pub mod queue;
pub mod score;
pub mod season;

pub use admin::{AdminRecord, AdminStore};
pub use agent::{AgentRecord, AgentStore};
pub use audition::{AuditionRecord, AuditionStore, AuditionUpsert};
pub use challenge::{ChallengeRecord, ChallengeStore, SupersededChallenge};
pub use error::StoreError;
pub use judge::{JudgeRecord, JudgeStore};
pub use performance::{PerformanceRecord, PerformanceStore};
pub use queue::{QueueEntry, QueueStore, StageAdvance};
pub use score::{ScoreRecord, ScoreStore};
pub use season::{SeasonRecord, SeasonStore};

/// Everything the arena services need from a backend.
pub trait ArenaStore:
    AgentStore
    + AdminStore
    + ChallengeStore
    + SeasonStore
    + AuditionStore
    + JudgeStore
    + QueueStore
    + PerformanceStore
    + ScoreStore
    + Send
    + Sync
{
}

impl<T> ArenaStore for T where
    T: AgentStore
        + AdminStore
        + ChallengeStore
        + SeasonStore
        + AuditionStore
        + JudgeStore
        + QueueStore
        + PerformanceStore
        + ScoreStore
        + Send
        + Sync
{
}
