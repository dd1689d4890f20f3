//! LMDB implementation of ScoreStore.

use agt_store::score::sort_newest_first;
use agt_store::{ScoreRecord, ScoreStore, StoreError};
use agt_types::{AgentId, SeasonId};

use crate::environment::{encode, get_decoded, scan_prefix_decoded, season_agent_key, LmdbStore};
use crate::LmdbError;

impl ScoreStore for LmdbStore {
    fn upsert_score(&self, record: &ScoreRecord) -> Result<Option<ScoreRecord>, StoreError> {
        let mut key = season_agent_key(&record.season_id, &record.agent_id).to_vec();
        key.extend_from_slice(record.judge.as_str().as_bytes());

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let previous: Option<ScoreRecord> = get_decoded(&self.scores_db, &wtxn, &key)?;
        let mut stored = record.clone();
        if let Some(existing) = &previous {
            stored.created_at = existing.created_at;
        }
        self.scores_db
            .put(&mut wtxn, &key, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(previous)
    }

    fn list_scores(
        &self,
        season: &SeasonId,
        agent: &AgentId,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut scores: Vec<ScoreRecord> =
            scan_prefix_decoded(&self.scores_db, &rtxn, &season_agent_key(season, agent))?;
        sort_newest_first(&mut scores);
        Ok(scores)
    }
}
