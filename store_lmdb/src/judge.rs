//! LMDB implementation of JudgeStore.

use agt_store::judge::{apply_judge_score, enroll_judge};
use agt_store::{JudgeRecord, JudgeStore, StoreError};
use agt_types::{SeasonId, WalletAddress};

use crate::environment::{encode, get_decoded, scan_prefix_decoded, season_address_key, LmdbStore};
use crate::LmdbError;

impl JudgeStore for LmdbStore {
    fn get_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_decoded(
            &self.judges_db,
            &rtxn,
            &season_address_key(season, address),
        )?)
    }

    fn upsert_judge(&self, record: &JudgeRecord) -> Result<JudgeRecord, StoreError> {
        let key = season_address_key(&record.season_id, &record.address);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing = get_decoded(&self.judges_db, &wtxn, &key)?;
        let stored = enroll_judge(existing, record);
        self.judges_db
            .put(&mut wtxn, &key, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(stored)
    }

    fn deactivate_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError> {
        let key = season_address_key(season, address);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let Some(mut judge) = get_decoded::<JudgeRecord>(&self.judges_db, &wtxn, &key)? else {
            return Ok(None);
        };
        if !judge.active {
            return Ok(None);
        }
        judge.active = false;
        self.judges_db
            .put(&mut wtxn, &key, &encode(&judge)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(Some(judge))
    }

    fn list_judges(&self, season: &SeasonId) -> Result<Vec<JudgeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_prefix_decoded(
            &self.judges_db,
            &rtxn,
            season.as_bytes(),
        )?)
    }

    fn record_judge_score(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
        score: u8,
        replaced: Option<u8>,
    ) -> Result<JudgeRecord, StoreError> {
        let key = season_address_key(season, address);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut judge: JudgeRecord = get_decoded(&self.judges_db, &wtxn, &key)?
            .ok_or_else(|| StoreError::NotFound(format!("judge {address}")))?;
        apply_judge_score(&mut judge, score, replaced);
        self.judges_db
            .put(&mut wtxn, &key, &encode(&judge)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(judge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::test_support::{addr, temp_store};
    use agt_types::Timestamp;

    fn judge(season: SeasonId, c: char) -> JudgeRecord {
        JudgeRecord {
            season_id: season,
            address: addr(c),
            specializations: vec!["poetry".into()],
            bio: None,
            active: true,
            performances_judged: 0,
            score_total: 0,
            assigned_at: Timestamp::new(0),
        }
    }

    fn active(store: &LmdbStore, season: &SeasonId) -> usize {
        store
            .list_judges(season)
            .unwrap()
            .iter()
            .filter(|j| j.active)
            .count()
    }

    #[test]
    fn deactivation_keeps_the_row() {
        let (_dir, store) = temp_store();
        let season = SeasonId::new_random();
        store.upsert_judge(&judge(season, '1')).unwrap();
        store.upsert_judge(&judge(season, '3')).unwrap();
        store.upsert_judge(&judge(SeasonId::new_random(), '5')).unwrap();
        assert_eq!(active(&store, &season), 2);

        let gone = store.deactivate_judge(&season, &addr('1')).unwrap().unwrap();
        assert!(!gone.active);
        assert!(store.deactivate_judge(&season, &addr('1')).unwrap().is_none());
        assert!(store.deactivate_judge(&season, &addr('9')).unwrap().is_none());
        assert_eq!(store.list_judges(&season).unwrap().len(), 2);
        assert_eq!(active(&store, &season), 1);
    }

    #[test]
    fn upsert_does_not_lose_score_totals() {
        let (_dir, store) = temp_store();
        let season = SeasonId::new_random();
        store.upsert_judge(&judge(season, '1')).unwrap();
        store.record_judge_score(&season, &addr('1'), 7, None).unwrap();

        let mut again = judge(season, '1');
        again.specializations = vec!["music".into()];
        let stored = store.upsert_judge(&again).unwrap();
        assert_eq!(stored.performances_judged, 1);
        assert_eq!(stored.score_total, 7);
        assert_eq!(stored.specializations, vec!["music".to_string()]);
    }

    #[test]
    fn score_totals_account_for_overwrites() {
        let (_dir, store) = temp_store();
        let season = SeasonId::new_random();
        store.upsert_judge(&judge(season, '1')).unwrap();

        store.record_judge_score(&season, &addr('1'), 8, None).unwrap();
        store.record_judge_score(&season, &addr('1'), 4, None).unwrap();
        let j = store
            .record_judge_score(&season, &addr('1'), 6, Some(8))
            .unwrap();
        assert_eq!(j.performances_judged, 2);
        assert_eq!(j.score_total, 10);
        assert_eq!(j.average_score_given(), Some(5.0));
    }
}
