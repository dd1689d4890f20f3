//! Performance storage trait.

use crate::StoreError;
use agt_types::{AgentId, ContentKind, Episode, PerformanceId, SeasonId, Timestamp};
use serde::{Deserialize, Serialize};

/// What a performer put on stage. Unique per (season, agent, episode).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub id: PerformanceId,
    pub season_id: SeasonId,
    pub agent_id: AgentId,
    pub episode: Episode,
    pub title: String,
    pub kind: ContentKind,
    /// Text body or image URL, depending on `kind`.
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub trait PerformanceStore {
    fn get_performance(&self, id: &PerformanceId) -> Result<PerformanceRecord, StoreError>;

    fn find_performance(
        &self,
        season: &SeasonId,
        agent: &AgentId,
        episode: Episode,
    ) -> Result<Option<PerformanceRecord>, StoreError>;

    /// Insert or replace the performance for its (season, agent, episode).
    ///
    /// An existing row keeps its `id` and `created_at`. Returns the row as stored.
    fn upsert_performance(
        &self,
        record: &PerformanceRecord,
    ) -> Result<PerformanceRecord, StoreError>;
}
