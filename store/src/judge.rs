//! Judge roster storage trait.

use crate::StoreError;
use agt_types::{SeasonId, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// A judge assignment. Unique per (season, judge address).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRecord {
    pub season_id: SeasonId,
    pub address: WalletAddress,
    pub specializations: Vec<String>,
    /// Set when the judge registered themself.
    pub bio: Option<String>,
    /// Cleared on removal; the row and its totals stay for history.
    pub active: bool,
    /// Distinct performers this judge has scored.
    pub performances_judged: u32,
    /// Sum of the judge's current scores, for the running average.
    pub score_total: u64,
    pub assigned_at: Timestamp,
}

impl JudgeRecord {
    pub fn average_score_given(&self) -> Option<f64> {
        (self.performances_judged > 0)
            .then(|| self.score_total as f64 / f64::from(self.performances_judged))
    }
}

pub trait JudgeStore {
    fn get_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError>;

    /// Atomically put `record.address` on the roster as an active judge.
    ///
    /// An existing row keeps its totals and `assigned_at`; see
    /// [`enroll_judge`]. Returns the row as stored.
    fn upsert_judge(&self, record: &JudgeRecord) -> Result<JudgeRecord, StoreError>;

    /// Mark the judge inactive. Returns the updated row, or `None` when the
    /// judge is absent or already inactive.
    fn deactivate_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError>;

    fn list_judges(&self, season: &SeasonId) -> Result<Vec<JudgeRecord>, StoreError>;

    /// Atomically fold one score into the judge's totals.
    ///
    /// `replaced` is the judge's previous score for the same performer, if
    /// this score overwrote one; the performer is then not counted twice.
    /// `NotFound` if the judge is not on the roster.
    fn record_judge_score(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
        score: u8,
        replaced: Option<u8>,
    ) -> Result<JudgeRecord, StoreError>;
}

/// The merge shared by every backend's `upsert_judge`.
///
/// Re-enrolling reactivates the judge and replaces its specializations; a
/// bio is only replaced by a new one.
pub fn enroll_judge(existing: Option<JudgeRecord>, incoming: &JudgeRecord) -> JudgeRecord {
    match existing {
        Some(existing) => JudgeRecord {
            specializations: incoming.specializations.clone(),
            bio: incoming.bio.clone().or(existing.bio.clone()),
            active: true,
            ..existing
        },
        None => JudgeRecord {
            active: true,
            ..incoming.clone()
        },
    }
}

/// The totals update shared by every backend's `record_judge_score`.
pub fn apply_judge_score(record: &mut JudgeRecord, score: u8, replaced: Option<u8>) {
    match replaced {
        Some(old) => {
            record.score_total = record.score_total.saturating_sub(u64::from(old));
        }
        None => record.performances_judged += 1,
    }
    record.score_total += u64::from(score);
}
