//! Judge scores and their aggregation.

use std::sync::Arc;

use agt_season::JudgeRoster;
use agt_store::{ArenaStore, ScoreRecord};
use agt_types::{AgentId, ArenaParams, Clock, PerformanceId, SeasonId, WalletAddress};
use serde::Serialize;
use tracing::info;

use crate::StageError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: u32,
    pub average: Option<f64>,
}

impl ScoreSummary {
    pub fn of(scores: &[ScoreRecord]) -> Self {
        let count = scores.len() as u32;
        let total: u64 = scores.iter().map(|s| u64::from(s.score)).sum();
        Self {
            count,
            average: (count > 0).then(|| total as f64 / f64::from(count)),
        }
    }
}

pub struct ScoreAggregator {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    roster: JudgeRoster,
    params: ArenaParams,
}

impl ScoreAggregator {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>, params: ArenaParams) -> Self {
        Self {
            roster: JudgeRoster::new(store.clone(), clock.clone()),
            store,
            clock,
            params,
        }
    }

    /// Record `judge`'s score for a performance. Scoring the same performer
    /// again overwrites the earlier score.
    pub fn submit_score(
        &self,
        season_id: &SeasonId,
        judge: &WalletAddress,
        performance_id: &PerformanceId,
        score: i64,
        notes: Option<String>,
    ) -> Result<ScoreRecord, StageError> {
        if !self.roster.is_active(season_id, judge)? {
            return Err(StageError::NotAJudge);
        }
        if !self.params.score_in_range(score) {
            return Err(StageError::InvalidScore(score));
        }
        let score = u8::try_from(score).map_err(|_| StageError::InvalidScore(score))?;
        let performance = match self.store.get_performance(performance_id) {
            Ok(p) if p.season_id == *season_id => p,
            Ok(_) => return Err(StageError::PerformanceNotFound(performance_id.to_string())),
            Err(e) if e.is_not_found() => {
                return Err(StageError::PerformanceNotFound(performance_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let now = self.clock.now();
        let mut record = ScoreRecord {
            season_id: *season_id,
            agent_id: performance.agent_id,
            judge: judge.clone(),
            performance_id: *performance_id,
            score,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };
        let previous = self.store.upsert_score(&record)?;
        if let Some(prev) = &previous {
            record.created_at = prev.created_at;
        }
        self.roster
            .record_score(season_id, judge, score, previous.map(|p| p.score))?;

        info!(
            season = %season_id,
            agent = %record.agent_id,
            judge = %judge,
            score,
            "score recorded"
        );
        Ok(record)
    }

    /// Every score for a performer, newest first.
    pub fn scores_for(
        &self,
        season_id: &SeasonId,
        agent_id: &AgentId,
    ) -> Result<Vec<ScoreRecord>, StageError> {
        Ok(self.store.list_scores(season_id, agent_id)?)
    }

    pub fn summary(
        &self,
        season_id: &SeasonId,
        agent_id: &AgentId,
    ) -> Result<ScoreSummary, StageError> {
        Ok(ScoreSummary::of(&self.scores_for(season_id, agent_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_nothing() {
        assert_eq!(
            ScoreSummary::of(&[]),
            ScoreSummary {
                count: 0,
                average: None
            }
        );
    }
}
