//! LMDB implementation of ChallengeStore.

use agt_store::{ChallengeRecord, ChallengeStore, StoreError};
use agt_types::WalletAddress;

use crate::environment::{encode, get_decoded, LmdbStore};
use crate::LmdbError;

impl ChallengeStore for LmdbStore {
    fn replace_challenge(
        &self,
        record: &ChallengeRecord,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        let key = record.address.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let previous: Option<ChallengeRecord> = get_decoded(&self.challenges_db, &wtxn, key)?;
        let stored = record.superseding(previous.as_ref());
        self.challenges_db
            .put(&mut wtxn, key, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(previous)
    }

    fn take_challenge(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        let key = address.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let taken: Option<ChallengeRecord> = get_decoded(&self.challenges_db, &wtxn, key)?;
        if taken.is_some() {
            self.challenges_db
                .delete(&mut wtxn, key)
                .map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;
        }
        Ok(taken)
    }

    fn get_challenge(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_decoded(
            &self.challenges_db,
            &rtxn,
            address.as_str().as_bytes(),
        )?)
    }
}
