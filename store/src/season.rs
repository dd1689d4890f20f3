//! Season storage trait.

use crate::StoreError;
use agt_types::{SeasonId, SeasonPhase, SeasonWindows, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub id: SeasonId,
    pub name: String,
    pub description: Option<String>,
    pub phase: SeasonPhase,
    pub activated_at: Option<Timestamp>,
    /// Fixed at activation; `None` while in draft.
    pub windows: Option<SeasonWindows>,
    pub created_by: WalletAddress,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub trait SeasonStore {
    fn get_season(&self, id: &SeasonId) -> Result<SeasonRecord, StoreError>;

    /// Insert or overwrite unconditionally.
    fn put_season(&self, record: &SeasonRecord) -> Result<(), StoreError>;

    /// All seasons, newest first.
    fn list_seasons(&self) -> Result<Vec<SeasonRecord>, StoreError>;

    /// Overwrite the season only if its stored phase still equals `expected`.
    ///
    /// Returns `false` (and writes nothing) when another writer moved the
    /// phase first. `NotFound` if the season does not exist.
    fn replace_season_if(
        &self,
        record: &SeasonRecord,
        expected: SeasonPhase,
    ) -> Result<bool, StoreError>;
}
