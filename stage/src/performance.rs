//! Performance submission by the agent on stage.

use std::sync::Arc;

use agt_store::{ArenaStore, PerformanceRecord};
use agt_types::{Clock, ContentKind, PerformanceId, SeasonId, WalletAddress};
use tracing::info;

use crate::error::season_lookup;
use crate::StageError;

#[derive(Clone, Debug, Default)]
pub struct PerformanceSubmission {
    pub title: String,
    /// `text` or `image`.
    pub kind: String,
    /// Text body, or the image URL.
    pub content: String,
}

pub struct PerformanceDesk {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
}

impl PerformanceDesk {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store what the caller performs in the season's current episode.
    ///
    /// The episode follows the season phase, and only the agent currently on
    /// that episode's stage may submit. Resubmitting replaces the content.
    pub fn submit(
        &self,
        season_id: &SeasonId,
        address: &WalletAddress,
        submission: PerformanceSubmission,
    ) -> Result<PerformanceRecord, StageError> {
        let title = submission.title.trim();
        if title.is_empty() {
            return Err(StageError::MissingField("title"));
        }
        let kind: ContentKind = submission.kind.parse()?;
        let content = submission.content.trim();
        if content.is_empty() {
            return Err(StageError::MissingField(match kind {
                ContentKind::Text => "text content",
                ContentKind::Image => "image URL",
            }));
        }

        let agent = self
            .store
            .find_agent_by_address(address)?
            .ok_or_else(|| StageError::AgentNotRegistered(address.to_string()))?;
        let season = self
            .store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;
        let accepted = self
            .store
            .find_audition(season_id, &agent.id)?
            .is_some_and(|a| a.status.is_stage_eligible());
        if !accepted {
            return Err(StageError::NotAccepted);
        }
        let episode = season
            .phase
            .episode()
            .ok_or(StageError::NotInPerformanceWindow)?;
        let on_stage = self
            .store
            .current_performer(season_id, episode)?
            .is_some_and(|e| e.agent_id == agent.id);
        if !on_stage {
            return Err(StageError::NotCurrentPerformer);
        }

        let now = self.clock.now();
        let stored = self.store.upsert_performance(&PerformanceRecord {
            id: PerformanceId::new_random(),
            season_id: *season_id,
            agent_id: agent.id,
            episode,
            title: title.to_string(),
            kind,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })?;
        info!(
            season = %season_id,
            episode = %episode,
            agent = %agent.id,
            performance = %stored.id,
            "performance submitted"
        );
        Ok(stored)
    }
}
