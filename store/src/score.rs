//! Judge score storage trait.

use crate::StoreError;
use agt_types::{AgentId, PerformanceId, SeasonId, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// One judge's score for one performer. Unique per (season, agent, judge);
/// re-scoring overwrites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub season_id: SeasonId,
    pub agent_id: AgentId,
    pub judge: WalletAddress,
    /// The performance the score was given for.
    pub performance_id: PerformanceId,
    pub score: u8,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub trait ScoreStore {
    /// Insert or overwrite the score for (season, agent, judge).
    ///
    /// An overwritten row keeps its `created_at`. Returns the replaced row.
    fn upsert_score(&self, record: &ScoreRecord) -> Result<Option<ScoreRecord>, StoreError>;

    /// Scores for one performer, newest update first.
    fn list_scores(&self, season: &SeasonId, agent: &AgentId)
        -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Sort scores newest update first; ties broken by judge address.
pub fn sort_newest_first(scores: &mut [ScoreRecord]) {
    scores.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.judge.cmp(&b.judge))
    });
}
