//! LMDB implementation of PerformanceStore.

use agt_store::{PerformanceRecord, PerformanceStore, StoreError};
use agt_types::{AgentId, Episode, PerformanceId, SeasonId};

use crate::environment::{encode, get_decoded, season_agent_key, LmdbStore};
use crate::LmdbError;

/// `season_id ++ agent_id ++ episode` (33 bytes).
fn performance_key(season: &SeasonId, agent: &AgentId, episode: Episode) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[..32].copy_from_slice(&season_agent_key(season, agent));
    key[32] = episode.number();
    key
}

impl PerformanceStore for LmdbStore {
    fn get_performance(&self, id: &PerformanceId) -> Result<PerformanceRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(key) = self
            .performance_ids_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Err(StoreError::NotFound(format!("performance {id}")));
        };
        get_decoded(&self.performances_db, &rtxn, key)?
            .ok_or_else(|| StoreError::Corruption(format!("dangling performance index {id}")))
    }

    fn find_performance(
        &self,
        season: &SeasonId,
        agent: &AgentId,
        episode: Episode,
    ) -> Result<Option<PerformanceRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_decoded(
            &self.performances_db,
            &rtxn,
            &performance_key(season, agent, episode),
        )?)
    }

    fn upsert_performance(
        &self,
        record: &PerformanceRecord,
    ) -> Result<PerformanceRecord, StoreError> {
        let key = performance_key(&record.season_id, &record.agent_id, record.episode);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut stored = record.clone();
        if let Some(existing) =
            get_decoded::<PerformanceRecord>(&self.performances_db, &wtxn, &key)?
        {
            stored.id = existing.id;
            stored.created_at = existing.created_at;
        }
        self.performances_db
            .put(&mut wtxn, &key, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        self.performance_ids_db
            .put(&mut wtxn, stored.id.as_bytes(), &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(stored)
    }
}
