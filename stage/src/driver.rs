//! The timeout fallback around quorum auto-advance.
//!
//! Each [`StageDriver::tick`] is one poll; an external scheduler calls it
//! on an interval. Quorum advances as soon as enough judges have scored;
//! otherwise the clock forces the stage forward once the performer has had
//! their time.

use std::sync::Arc;

use agt_types::{Clock, Episode, SeasonId};
use serde::Serialize;
use tracing::info;

use crate::{AutoAdvance, StageError, StageMove, StageScheduler};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceReason {
    /// Nothing was submitted within the grace period.
    NoShow,
    /// The performance slot ran out before quorum.
    TimeUp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Nobody was on stage; the first pending performer was promoted.
    Started(StageMove),
    Quorum(StageMove),
    Forced {
        reason: ForceReason,
        #[serde(flatten)]
        stage_move: StageMove,
    },
    /// Nothing to do yet.
    Idle { waiting: AutoAdvance },
}

pub struct StageDriver {
    scheduler: Arc<StageScheduler>,
    clock: Arc<dyn Clock>,
    performance_duration_secs: u64,
    no_show_grace_secs: u64,
}

impl StageDriver {
    pub fn new(
        scheduler: Arc<StageScheduler>,
        clock: Arc<dyn Clock>,
        performance_duration_secs: u64,
        no_show_grace_secs: u64,
    ) -> Self {
        Self {
            scheduler,
            clock,
            performance_duration_secs,
            no_show_grace_secs,
        }
    }

    pub fn tick(
        &self,
        season_id: &SeasonId,
        episode: Episode,
        min_scores: Option<u32>,
    ) -> Result<TickOutcome, StageError> {
        let now = self.clock.now();
        let on_stage_for = |started: Option<agt_types::Timestamp>| {
            started.map_or(0, |s| s.elapsed_since(now))
        };

        match self.scheduler.auto_advance(season_id, episode, min_scores)? {
            AutoAdvance::NoCurrent => Ok(TickOutcome::Started(
                self.scheduler.start_next(season_id, episode)?,
            )),
            AutoAdvance::Advanced(stage_move) => Ok(TickOutcome::Quorum(stage_move)),
            AutoAdvance::NoPerformance { current }
                if on_stage_for(current.started_at) > self.no_show_grace_secs =>
            {
                self.force(season_id, episode, ForceReason::NoShow, current.id)
            }
            AutoAdvance::WaitingForScores { current, .. }
                if on_stage_for(current.started_at) >= self.performance_duration_secs =>
            {
                self.force(season_id, episode, ForceReason::TimeUp, current.id)
            }
            waiting => Ok(TickOutcome::Idle { waiting }),
        }
    }

    fn force(
        &self,
        season_id: &SeasonId,
        episode: Episode,
        reason: ForceReason,
        expected: agt_types::QueueEntryId,
    ) -> Result<TickOutcome, StageError> {
        let stage_move = self
            .scheduler
            .advance_from(season_id, episode, Some(expected))?;
        info!(season = %season_id, episode = %episode, ?reason, "stage forced forward");
        Ok(TickOutcome::Forced { reason, stage_move })
    }
}
