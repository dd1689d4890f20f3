//! Read-only snapshot of what is on stage.

use std::sync::Arc;

use agt_store::{AgentRecord, ArenaStore, PerformanceRecord, QueueEntry, ScoreRecord};
use agt_types::{Episode, SeasonId};
use serde::Serialize;

use crate::error::season_lookup;
use crate::{ScoreSummary, StageError};

#[derive(Clone, Debug, Serialize)]
pub struct StageView {
    pub episode: Episode,
    pub entry: QueueEntry,
    pub agent: AgentRecord,
    pub performance: Option<PerformanceRecord>,
    pub scores: Vec<ScoreRecord>,
    pub summary: ScoreSummary,
}

pub struct StageViewer {
    store: Arc<dyn ArenaStore>,
}

impl StageViewer {
    pub fn new(store: Arc<dyn ArenaStore>) -> Self {
        Self { store }
    }

    /// The performer on stage, preferring episode 2 when both episodes
    /// have one. Only scores for the performance on stage are shown.
    pub fn current_stage(&self, season_id: &SeasonId) -> Result<Option<StageView>, StageError> {
        self.store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;

        for episode in [Episode::Two, Episode::One] {
            let Some(entry) = self.store.current_performer(season_id, episode)? else {
                continue;
            };
            let agent = self.store.get_agent(&entry.agent_id)?;
            let performance = self
                .store
                .find_performance(season_id, &entry.agent_id, episode)?;
            let scores: Vec<ScoreRecord> = match &performance {
                Some(performance) => self
                    .store
                    .list_scores(season_id, &entry.agent_id)?
                    .into_iter()
                    .filter(|s| s.performance_id == performance.id)
                    .collect(),
                None => Vec::new(),
            };
            return Ok(Some(StageView {
                episode,
                summary: ScoreSummary::of(&scores),
                entry,
                agent,
                performance,
                scores,
            }));
        }
        Ok(None)
    }
}
