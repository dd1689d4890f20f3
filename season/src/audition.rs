//! The audition gate: who is admitted to a season's stage.

use std::sync::Arc;

use agt_identity::AgentRegistry;
use agt_store::{AgentRecord, ArenaStore, AuditionRecord, AuditionUpsert};
use agt_types::{
    AgentId, AuditionId, AuditionStatus, Clock, SeasonId, TalentCategory, WalletAddress,
};
use tracing::{debug, info, warn};

use crate::error::season_lookup;
use crate::SeasonError;

/// What an agent sends when auditioning.
#[derive(Clone, Debug, Default)]
pub struct AuditionSubmission {
    /// Used to register the agent if it has no profile yet.
    pub display_name: String,
    pub category: String,
    pub title: String,
    pub content: String,
}

fn required(value: &str, field: &'static str) -> Result<String, SeasonError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SeasonError::MissingField(field));
    }
    Ok(value.to_string())
}

pub struct AuditionGate {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    agents: AgentRegistry,
}

impl AuditionGate {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            agents: AgentRegistry::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Submit or replace the caller's audition for `season_id`.
    ///
    /// Only accepted while the frozen auditions window contains now.
    /// Resubmitting before a verdict replaces the content and resets the
    /// review to pending.
    pub fn submit(
        &self,
        season_id: &SeasonId,
        address: &WalletAddress,
        submission: AuditionSubmission,
    ) -> Result<(AgentRecord, AuditionRecord), SeasonError> {
        let category: TalentCategory = submission.category.parse()?;
        let title = required(&submission.title, "title")?;
        let content = required(&submission.content, "content")?;

        let season = self
            .store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;
        let now = self.clock.now();
        let open = season
            .windows
            .is_some_and(|w| w.auditions.contains(now));
        if !open {
            debug!(season = %season_id, address = %address, "audition outside window");
            return Err(SeasonError::AuditionsClosed);
        }

        let agent = self.agents.ensure(address, &submission.display_name)?;
        let outcome = self.store.upsert_audition(&AuditionRecord {
            id: AuditionId::new_random(),
            season_id: *season_id,
            agent_id: agent.id,
            category,
            title,
            content,
            status: AuditionStatus::Pending,
            reviewer: None,
            review_notes: None,
            rejection_reason: None,
            submitted_at: now,
            updated_at: now,
            reviewed_at: None,
        })?;
        let stored = match outcome {
            AuditionUpsert::Stored(stored) => stored,
            AuditionUpsert::Decided(existing) => {
                return Err(SeasonError::AuditionAlreadyDecided(existing.status))
            }
        };
        info!(season = %season_id, agent = %agent.id, audition = %stored.id, "audition submitted");
        Ok((agent, stored))
    }

    /// Record a review decision.
    pub fn decide(
        &self,
        season_id: &SeasonId,
        audition_id: &AuditionId,
        status: &str,
        notes: Option<String>,
        reviewer: &WalletAddress,
    ) -> Result<AuditionRecord, SeasonError> {
        let next: AuditionStatus = status.parse()?;
        let audition = match self.store.get_audition(audition_id) {
            Ok(a) if a.season_id == *season_id => a,
            Ok(_) => return Err(SeasonError::AuditionNotFound(audition_id.to_string())),
            Err(e) if e.is_not_found() => {
                return Err(SeasonError::AuditionNotFound(audition_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if !audition.status.can_transition_to(next) {
            return Err(SeasonError::InvalidTransition {
                from: audition.status,
                to: next,
            });
        }

        let now = self.clock.now();
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let updated = AuditionRecord {
            status: next,
            reviewer: Some(reviewer.clone()),
            rejection_reason: if next == AuditionStatus::Rejected {
                notes.clone()
            } else {
                None
            },
            review_notes: notes,
            reviewed_at: Some(now),
            updated_at: now,
            ..audition.clone()
        };
        if !self.store.update_audition_if(&updated, &audition)? {
            warn!(season = %season_id, audition = %audition_id, "audition changed under review");
            return Err(SeasonError::AuditionConflict);
        }
        info!(
            season = %season_id,
            audition = %audition_id,
            status = %next,
            reviewer = %reviewer,
            "audition reviewed"
        );
        Ok(updated)
    }

    pub fn list(&self, season_id: &SeasonId) -> Result<Vec<AuditionRecord>, SeasonError> {
        Ok(self.store.list_auditions(season_id)?)
    }

    pub fn get_for(
        &self,
        season_id: &SeasonId,
        agent_id: &AgentId,
    ) -> Result<Option<AuditionRecord>, SeasonError> {
        Ok(self.store.find_audition(season_id, agent_id)?)
    }

    /// The caller's own audition. Fails with `AgentNotRegistered` when the
    /// wallet has no agent and `AuditionNotFound` when it never auditioned.
    pub fn mine(
        &self,
        season_id: &SeasonId,
        address: &WalletAddress,
    ) -> Result<AuditionRecord, SeasonError> {
        let agent = self.agents.require(address)?;
        self.get_for(season_id, &agent.id)?
            .ok_or_else(|| SeasonError::AuditionNotFound(format!("for {address}")))
    }
}
