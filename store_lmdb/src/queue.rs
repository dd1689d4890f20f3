//! LMDB implementation of QueueStore.
//!
//! Key: `season_id(16) ++ episode(1) ++ position_be_u32(4)`. Big-endian
//! positions sort numerically, so a prefix scan yields the running order.

use agt_store::queue::plan_advance;
use agt_store::{QueueEntry, QueueStore, StageAdvance, StoreError};
use agt_types::{Episode, QueueEntryId, SeasonId, Timestamp};
use tracing::debug;

use crate::environment::{
    encode, scan_prefix, scan_prefix_decoded, season_episode_prefix, LmdbStore,
};
use crate::LmdbError;

fn queue_key(entry: &QueueEntry) -> [u8; 21] {
    let mut key = [0u8; 21];
    key[..17].copy_from_slice(&season_episode_prefix(&entry.season_id, entry.episode));
    key[17..].copy_from_slice(&entry.position.to_be_bytes());
    key
}

impl QueueStore for LmdbStore {
    fn replace_queue(
        &self,
        season: &SeasonId,
        episode: Episode,
        entries: &[QueueEntry],
    ) -> Result<(), StoreError> {
        let prefix = season_episode_prefix(season, episode);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let old_keys: Vec<Vec<u8>> = scan_prefix(&self.queue_db, &wtxn, &prefix)?
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        for k in &old_keys {
            self.queue_db
                .delete(&mut wtxn, k)
                .map_err(LmdbError::from)?;
        }
        for entry in entries {
            self.queue_db
                .put(&mut wtxn, &queue_key(entry), &encode(entry)?)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(
            season = %season,
            episode = episode.number(),
            removed = old_keys.len(),
            inserted = entries.len(),
            "replaced performance queue"
        );
        Ok(())
    }

    fn list_queue(
        &self,
        season: &SeasonId,
        episode: Episode,
    ) -> Result<Vec<QueueEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_prefix_decoded(
            &self.queue_db,
            &rtxn,
            &season_episode_prefix(season, episode),
        )?)
    }

    fn advance_stage(
        &self,
        season: &SeasonId,
        episode: Episode,
        expected: Option<QueueEntryId>,
        now: Timestamp,
    ) -> Result<StageAdvance, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let queue: Vec<QueueEntry> = scan_prefix_decoded(
            &self.queue_db,
            &wtxn,
            &season_episode_prefix(season, episode),
        )?;
        let (outcome, changed) = plan_advance(&queue, expected, now);
        if changed.is_empty() {
            return Ok(outcome);
        }
        for entry in &changed {
            self.queue_db
                .put(&mut wtxn, &queue_key(entry), &encode(entry)?)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(outcome)
    }
}
