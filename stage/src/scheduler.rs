//! Running order and the on-stage slot.

use std::collections::HashSet;
use std::sync::Arc;

use agt_season::JudgeRoster;
use agt_store::{ArenaStore, QueueEntry, StageAdvance};
use agt_types::{AgentId, Clock, Episode, QueueEntryId, QueueStatus, SeasonId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::season_lookup;
use crate::StageError;

/// Result of one retire-then-promote step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageMove {
    pub retired: Option<QueueEntry>,
    /// The new performer; `None` once the queue is exhausted.
    pub current: Option<QueueEntry>,
}

impl StageMove {
    pub fn done(&self) -> bool {
        self.current.is_none()
    }
}

/// Outcome of a quorum check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoAdvance {
    /// Nobody is on stage.
    NoCurrent,
    /// The performer has not submitted anything yet.
    NoPerformance { current: QueueEntry },
    WaitingForScores {
        current: QueueEntry,
        judge_count: u32,
        scored: u32,
        required: u32,
    },
    Advanced(StageMove),
}

/// Scores needed before the stage may auto-advance.
///
/// `min_scores` defaults to the active roster size and is clamped into
/// `1..=judge_count`. An empty roster still needs at least one score, so
/// the stage waits for the timeout fallback.
pub fn required_scores(judge_count: u32, min_scores: Option<u32>) -> u32 {
    if judge_count == 0 {
        return min_scores.unwrap_or(0).max(1);
    }
    min_scores.unwrap_or(judge_count).clamp(1, judge_count)
}

pub struct StageScheduler {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    roster: JudgeRoster,
}

impl StageScheduler {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            roster: JudgeRoster::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Replace the (season, episode) running order with `agent_ids`, in order.
    pub fn seed(
        &self,
        season_id: &SeasonId,
        episode: Episode,
        agent_ids: &[AgentId],
    ) -> Result<Vec<QueueEntry>, StageError> {
        if agent_ids.is_empty() {
            return Err(StageError::MissingAgentIds);
        }
        let mut seen = HashSet::with_capacity(agent_ids.len());
        for id in agent_ids {
            if !seen.insert(*id) {
                return Err(StageError::DuplicateAgent(id.to_string()));
            }
        }
        self.store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;
        for id in agent_ids {
            if !self.store.agent_exists(id)? {
                return Err(StageError::AgentNotFound(id.to_string()));
            }
        }

        let entries: Vec<QueueEntry> = agent_ids
            .iter()
            .zip(1u32..)
            .map(|(agent_id, position)| QueueEntry {
                id: QueueEntryId::new_random(),
                season_id: *season_id,
                episode,
                agent_id: *agent_id,
                position,
                status: QueueStatus::Pending,
                started_at: None,
                ended_at: None,
            })
            .collect();
        self.store.replace_queue(season_id, episode, &entries)?;
        info!(season = %season_id, episode = %episode, performers = entries.len(), "queue seeded");
        Ok(entries)
    }

    pub fn queue(
        &self,
        season_id: &SeasonId,
        episode: Episode,
    ) -> Result<Vec<QueueEntry>, StageError> {
        Ok(self.store.list_queue(season_id, episode)?)
    }

    pub fn current(
        &self,
        season_id: &SeasonId,
        episode: Episode,
    ) -> Result<Option<QueueEntry>, StageError> {
        Ok(self.store.current_performer(season_id, episode)?)
    }

    /// Retire whoever is on stage and promote the next pending performer.
    pub fn start_next(
        &self,
        season_id: &SeasonId,
        episode: Episode,
    ) -> Result<StageMove, StageError> {
        self.store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;
        let current = self.store.current_performer(season_id, episode)?;
        self.advance_from(season_id, episode, current.map(|e| e.id))
    }

    /// Retire-then-promote, provided the performer on stage is still
    /// `expected`. Fails with `StageMoved` otherwise.
    pub fn advance_from(
        &self,
        season_id: &SeasonId,
        episode: Episode,
        expected: Option<QueueEntryId>,
    ) -> Result<StageMove, StageError> {
        let now = self.clock.now();
        let stage_move = match self
            .store
            .advance_stage(season_id, episode, expected, now)?
        {
            StageAdvance::Promoted { retired, current } => StageMove {
                retired,
                current: Some(current),
            },
            StageAdvance::Exhausted { retired } => StageMove {
                retired,
                current: None,
            },
            StageAdvance::Stale { current } => {
                warn!(
                    season = %season_id,
                    episode = %episode,
                    on_stage = ?current.map(|e| e.id.to_string()),
                    "stage moved concurrently"
                );
                return Err(StageError::StageMoved);
            }
        };

        match &stage_move.current {
            Some(entry) => info!(
                season = %season_id,
                episode = %episode,
                agent = %entry.agent_id,
                position = entry.position,
                "performer on stage"
            ),
            None => info!(season = %season_id, episode = %episode, "queue exhausted"),
        }
        Ok(stage_move)
    }

    /// Advance once the current performance has enough judge scores.
    ///
    /// Waiting is a normal outcome, not an error. Only scores given for the
    /// performer's current performance by judges still on the active roster
    /// count toward the quorum.
    pub fn auto_advance(
        &self,
        season_id: &SeasonId,
        episode: Episode,
        min_scores: Option<u32>,
    ) -> Result<AutoAdvance, StageError> {
        let Some(current) = self.store.current_performer(season_id, episode)? else {
            return Ok(AutoAdvance::NoCurrent);
        };
        let Some(performance) =
            self.store
                .find_performance(season_id, &current.agent_id, episode)?
        else {
            return Ok(AutoAdvance::NoPerformance { current });
        };

        let judges = self.roster.active_addresses(season_id)?;
        let judge_count = judges.len() as u32;
        let required = required_scores(judge_count, min_scores);
        let scored = self
            .store
            .list_scores(season_id, &current.agent_id)?
            .iter()
            .filter(|s| s.performance_id == performance.id && judges.contains(&s.judge))
            .count() as u32;
        if judge_count == 0 || scored < required {
            debug!(
                season = %season_id,
                episode = %episode,
                judge_count,
                scored,
                required,
                "waiting for scores"
            );
            return Ok(AutoAdvance::WaitingForScores {
                current,
                judge_count,
                scored,
                required,
            });
        }

        let stage_move = self.advance_from(season_id, episode, Some(current.id))?;
        Ok(AutoAdvance::Advanced(stage_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_defaults_to_roster_size() {
        assert_eq!(required_scores(3, None), 3);
        assert_eq!(required_scores(3, Some(2)), 2);
    }

    #[test]
    fn required_is_clamped() {
        assert_eq!(required_scores(3, Some(10)), 3);
        assert_eq!(required_scores(3, Some(0)), 1);
    }

    #[test]
    fn empty_roster_needs_at_least_one() {
        assert_eq!(required_scores(0, None), 1);
        assert_eq!(required_scores(0, Some(4)), 4);
    }
}
