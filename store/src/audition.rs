//! Audition storage trait.

use crate::StoreError;
use agt_types::{
    AgentId, AuditionId, AuditionStatus, SeasonId, TalentCategory, Timestamp, WalletAddress,
};
use serde::{Deserialize, Serialize};

/// An agent's admission request for one season. Unique per (season, agent).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditionRecord {
    pub id: AuditionId,
    pub season_id: SeasonId,
    pub agent_id: AgentId,
    pub category: TalentCategory,
    pub title: String,
    pub content: String,
    pub status: AuditionStatus,
    pub reviewer: Option<WalletAddress>,
    pub review_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

/// Outcome of [`AuditionStore::upsert_audition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditionUpsert {
    /// The row as stored.
    Stored(AuditionRecord),
    /// The existing row already carries a verdict; nothing was written.
    Decided(AuditionRecord),
}

pub trait AuditionStore {
    fn get_audition(&self, id: &AuditionId) -> Result<AuditionRecord, StoreError>;

    fn find_audition(
        &self,
        season: &SeasonId,
        agent: &AgentId,
    ) -> Result<Option<AuditionRecord>, StoreError>;

    /// Insert or replace the audition for `(record.season_id, record.agent_id)`
    /// unless the stored row is already accepted or rejected.
    ///
    /// When a row already exists its `id` and `submitted_at` are kept. The
    /// decided check and the write happen atomically.
    fn upsert_audition(&self, record: &AuditionRecord) -> Result<AuditionUpsert, StoreError>;

    /// Overwrite an existing audition (matched by id) only if the stored row
    /// still equals `expected`.
    ///
    /// Returns `false` (and writes nothing) when another writer changed the
    /// row first. `NotFound` if absent.
    fn update_audition_if(
        &self,
        record: &AuditionRecord,
        expected: &AuditionRecord,
    ) -> Result<bool, StoreError>;

    /// Auditions of a season ordered by submission time, then id.
    fn list_auditions(&self, season: &SeasonId) -> Result<Vec<AuditionRecord>, StoreError>;
}
