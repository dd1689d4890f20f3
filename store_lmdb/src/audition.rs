//! LMDB implementation of AuditionStore.
//!
//! Two databases: `auditions` keyed by `season_id ++ agent_id` (the unique
//! key, and a season prefix for listing) and `audition_ids` mapping an
//! audition id back to that key.

use agt_store::{AuditionRecord, AuditionStore, AuditionUpsert, StoreError};
use agt_types::{AgentId, AuditionId, SeasonId};

use crate::environment::{encode, get_decoded, scan_prefix_decoded, season_agent_key, LmdbStore};
use crate::LmdbError;

impl AuditionStore for LmdbStore {
    fn get_audition(&self, id: &AuditionId) -> Result<AuditionRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(key) = self
            .audition_ids_db
            .get(&rtxn, id.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Err(StoreError::NotFound(format!("audition {id}")));
        };
        get_decoded(&self.auditions_db, &rtxn, key)?
            .ok_or_else(|| StoreError::Corruption(format!("dangling audition index {id}")))
    }

    fn find_audition(
        &self,
        season: &SeasonId,
        agent: &AgentId,
    ) -> Result<Option<AuditionRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_decoded(
            &self.auditions_db,
            &rtxn,
            &season_agent_key(season, agent),
        )?)
    }

    fn upsert_audition(&self, record: &AuditionRecord) -> Result<AuditionUpsert, StoreError> {
        let key = season_agent_key(&record.season_id, &record.agent_id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut stored = record.clone();
        if let Some(existing) = get_decoded::<AuditionRecord>(&self.auditions_db, &wtxn, &key)? {
            if existing.status.is_decided() {
                return Ok(AuditionUpsert::Decided(existing));
            }
            stored.id = existing.id;
            stored.submitted_at = existing.submitted_at;
        }
        self.auditions_db
            .put(&mut wtxn, &key, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        self.audition_ids_db
            .put(&mut wtxn, stored.id.as_bytes(), &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(AuditionUpsert::Stored(stored))
    }

    fn update_audition_if(
        &self,
        record: &AuditionRecord,
        expected: &AuditionRecord,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let key = self
            .audition_ids_db
            .get(&wtxn, record.id.as_bytes())
            .map_err(LmdbError::from)?
            .map(<[u8]>::to_vec)
            .ok_or_else(|| StoreError::NotFound(format!("audition {}", record.id)))?;
        let stored: AuditionRecord = get_decoded(&self.auditions_db, &wtxn, &key)?
            .ok_or_else(|| StoreError::Corruption(format!("dangling audition index {}", record.id)))?;
        if stored != *expected {
            return Ok(false);
        }
        self.auditions_db
            .put(&mut wtxn, &key, &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn list_auditions(&self, season: &SeasonId) -> Result<Vec<AuditionRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut list: Vec<AuditionRecord> =
            scan_prefix_decoded(&self.auditions_db, &rtxn, season.as_bytes())?;
        list.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }
}
