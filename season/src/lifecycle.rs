//! Season lifecycle: creation, activation and forward-only phase moves.

use std::sync::Arc;

use agt_store::{ArenaStore, SeasonRecord};
use agt_types::{
    Clock, SeasonDurations, SeasonId, SeasonPhase, SeasonWindows, Timestamp, WalletAddress,
    Window, SECS_PER_DAY,
};
use tracing::{debug, info};

use crate::error::season_lookup;
use crate::SeasonError;

/// The windows an activation at `now` freezes into the season.
///
/// Auditions open at `now`; each episode starts `gap_secs` after the
/// previous window ends.
pub fn compute_windows(
    now: Timestamp,
    durations: &SeasonDurations,
    gap_secs: u64,
) -> SeasonWindows {
    let days = |n: u32| u64::from(n) * SECS_PER_DAY;
    let auditions = Window::starting_at(now, days(durations.auditions_days));
    let episode1 = Window::starting_at(
        auditions.end.plus_secs(gap_secs),
        days(durations.voting_days),
    );
    let episode2 = Window::starting_at(
        episode1.end.plus_secs(gap_secs),
        days(durations.episode2_days),
    );
    SeasonWindows {
        auditions,
        episode1,
        episode2,
    }
}

pub struct SeasonLifecycle {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    phase_gap_secs: u64,
}

impl SeasonLifecycle {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>, phase_gap_secs: u64) -> Self {
        Self {
            store,
            clock,
            phase_gap_secs,
        }
    }

    /// Create a season in `Draft`.
    pub fn create(
        &self,
        created_by: &WalletAddress,
        name: &str,
        description: Option<String>,
    ) -> Result<SeasonRecord, SeasonError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SeasonError::MissingName);
        }
        let now = self.clock.now();
        let record = SeasonRecord {
            id: SeasonId::new_random(),
            name: name.to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            phase: SeasonPhase::Draft,
            activated_at: None,
            windows: None,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.put_season(&record)?;
        info!(season = %record.id, name = %record.name, by = %created_by, "season created");
        Ok(record)
    }

    pub fn get(&self, id: &SeasonId) -> Result<SeasonRecord, SeasonError> {
        self.store.get_season(id).map_err(|e| season_lookup(id, e))
    }

    /// All seasons, newest first.
    pub fn list(&self) -> Result<Vec<SeasonRecord>, SeasonError> {
        Ok(self.store.list_seasons()?)
    }

    /// The most recently activated season, if any has left draft.
    pub fn current(&self) -> Result<Option<SeasonRecord>, SeasonError> {
        Ok(self
            .store
            .list_seasons()?
            .into_iter()
            .filter(|s| s.phase != SeasonPhase::Draft)
            .max_by_key(|s| s.activated_at))
    }

    /// Freeze the season's windows and open auditions.
    pub fn activate(
        &self,
        id: &SeasonId,
        durations: SeasonDurations,
    ) -> Result<SeasonRecord, SeasonError> {
        if !durations.is_valid() {
            return Err(SeasonError::InvalidDurations);
        }
        let season = self.get(id)?;
        if season.phase != SeasonPhase::Draft {
            return Err(SeasonError::NotDraft);
        }

        let now = self.clock.now();
        let windows = compute_windows(now, &durations, self.phase_gap_secs);
        let updated = SeasonRecord {
            phase: SeasonPhase::AuditionsOpen,
            activated_at: Some(now),
            windows: Some(windows),
            updated_at: now,
            ..season
        };
        if !self.store.replace_season_if(&updated, SeasonPhase::Draft)? {
            return Err(SeasonError::PhaseConflict);
        }
        info!(
            season = %id,
            auditions_end = %windows.auditions.end,
            episode2_end = %windows.episode2.end,
            "season activated"
        );
        Ok(updated)
    }

    /// Move the season forward. With no target, step once (clamped at
    /// `Closed`); an explicit target must lie strictly ahead.
    pub fn advance(
        &self,
        id: &SeasonId,
        target: Option<SeasonPhase>,
    ) -> Result<SeasonRecord, SeasonError> {
        let season = self.get(id)?;
        let current = season.phase;
        let next = match target {
            Some(t) if t <= current => {
                return Err(SeasonError::InvalidPhase(format!(
                    "{t} is not after {current}"
                )))
            }
            Some(t) => t,
            None => current.next(),
        };
        if next == current {
            debug!(season = %id, phase = %current, "season already closed");
            return Ok(season);
        }

        let updated = SeasonRecord {
            phase: next,
            updated_at: self.clock.now(),
            ..season
        };
        if !self.store.replace_season_if(&updated, current)? {
            return Err(SeasonError::PhaseConflict);
        }
        info!(season = %id, from = %current, to = %next, "season phase advanced");
        Ok(updated)
    }

    /// Like [`advance`](Self::advance) with the target given by name.
    pub fn advance_to_named(
        &self,
        id: &SeasonId,
        target: Option<&str>,
    ) -> Result<SeasonRecord, SeasonError> {
        let target = target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse::<SeasonPhase>)
            .transpose()?;
        self.advance(id, target)
    }
}
