//! LMDB implementation of SeasonStore.

use agt_store::{SeasonRecord, SeasonStore, StoreError};
use agt_types::{SeasonId, SeasonPhase};

use crate::environment::{encode, get_decoded, scan_prefix_decoded, LmdbStore};
use crate::LmdbError;

impl SeasonStore for LmdbStore {
    fn get_season(&self, id: &SeasonId) -> Result<SeasonRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_decoded(&self.seasons_db, &rtxn, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("season {id}")))
    }

    fn put_season(&self, record: &SeasonRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.seasons_db
            .put(&mut wtxn, record.id.as_bytes(), &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn list_seasons(&self) -> Result<Vec<SeasonRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut seasons: Vec<SeasonRecord> = scan_prefix_decoded(&self.seasons_db, &rtxn, &[])?;
        seasons.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(seasons)
    }

    fn replace_season_if(
        &self,
        record: &SeasonRecord,
        expected: SeasonPhase,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let stored: SeasonRecord = get_decoded(&self.seasons_db, &wtxn, record.id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("season {}", record.id)))?;
        if stored.phase != expected {
            return Ok(false);
        }
        self.seasons_db
            .put(&mut wtxn, record.id.as_bytes(), &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}
