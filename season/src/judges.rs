//! The per-season judge roster.

use std::collections::HashSet;
use std::sync::Arc;

use agt_crypto::parse_address;
use agt_identity::AgentRegistry;
use agt_store::{ArenaStore, JudgeRecord};
use agt_types::{Clock, SeasonId, WalletAddress};
use tracing::info;

use crate::error::season_lookup;
use crate::SeasonError;

pub struct JudgeRoster {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    agents: AgentRegistry,
}

fn normalize(specializations: Vec<String>) -> Vec<String> {
    specializations
        .into_iter()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl JudgeRoster {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            agents: AgentRegistry::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Put `raw_address` on the roster as an active judge.
    ///
    /// Re-adding an existing judge reactivates it and replaces its
    /// specializations; scoring totals are kept.
    pub fn add(
        &self,
        season_id: &SeasonId,
        raw_address: &str,
        specializations: Vec<String>,
    ) -> Result<JudgeRecord, SeasonError> {
        let address = parse_address(raw_address)?;
        let record = self.enroll(season_id, address, normalize(specializations), None)?;
        info!(season = %season_id, judge = %record.address, "judge added");
        Ok(record)
    }

    /// A registered agent putting itself on the roster.
    pub fn register_self(
        &self,
        season_id: &SeasonId,
        address: &WalletAddress,
        specializations: Vec<String>,
        bio: Option<String>,
    ) -> Result<JudgeRecord, SeasonError> {
        self.agents.require(address)?;
        let bio = bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
        let record = self.enroll(season_id, address.clone(), normalize(specializations), bio)?;
        info!(season = %season_id, judge = %address, "judge registered");
        Ok(record)
    }

    fn enroll(
        &self,
        season_id: &SeasonId,
        address: WalletAddress,
        specializations: Vec<String>,
        bio: Option<String>,
    ) -> Result<JudgeRecord, SeasonError> {
        self.store
            .get_season(season_id)
            .map_err(|e| season_lookup(season_id, e))?;
        Ok(self.store.upsert_judge(&JudgeRecord {
            season_id: *season_id,
            address,
            specializations,
            bio,
            active: true,
            performances_judged: 0,
            score_total: 0,
            assigned_at: self.clock.now(),
        })?)
    }

    /// Take the judge off the active roster. Its past scores stay on record
    /// but no longer count toward a quorum.
    pub fn remove(&self, season_id: &SeasonId, raw_address: &str) -> Result<(), SeasonError> {
        let address = parse_address(raw_address)?;
        if self.store.deactivate_judge(season_id, &address)?.is_none() {
            return Err(SeasonError::JudgeNotFound(address.to_string()));
        }
        info!(season = %season_id, judge = %address, "judge removed");
        Ok(())
    }

    /// Every judge ever on the roster, newest assignment first.
    pub fn list(&self, season_id: &SeasonId) -> Result<Vec<JudgeRecord>, SeasonError> {
        let mut judges = self.store.list_judges(season_id)?;
        judges.sort_by(|a, b| {
            b.assigned_at
                .cmp(&a.assigned_at)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(judges)
    }

    pub fn is_active(
        &self,
        season_id: &SeasonId,
        address: &WalletAddress,
    ) -> Result<bool, SeasonError> {
        Ok(self
            .store
            .get_judge(season_id, address)?
            .is_some_and(|j| j.active))
    }

    /// Addresses of the judges currently on the roster.
    pub fn active_addresses(
        &self,
        season_id: &SeasonId,
    ) -> Result<HashSet<WalletAddress>, SeasonError> {
        Ok(self
            .store
            .list_judges(season_id)?
            .into_iter()
            .filter(|j| j.active)
            .map(|j| j.address)
            .collect())
    }

    /// Fold a score into the judge's totals. `previous` is the score it
    /// replaced for the same performer, if any.
    pub fn record_score(
        &self,
        season_id: &SeasonId,
        judge: &WalletAddress,
        score: u8,
        previous: Option<u8>,
    ) -> Result<JudgeRecord, SeasonError> {
        self.store
            .record_judge_score(season_id, judge, score, previous)
            .map_err(|e| {
                if e.is_not_found() {
                    SeasonError::JudgeNotFound(judge.to_string())
                } else {
                    SeasonError::Store(e)
                }
            })
    }
}
