//! Performance queue storage trait.

use crate::StoreError;
use agt_types::{AgentId, Episode, QueueEntryId, QueueStatus, SeasonId, Timestamp};
use serde::{Deserialize, Serialize};

/// One slot in a (season, episode) running order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub season_id: SeasonId,
    pub episode: Episode,
    pub agent_id: AgentId,
    /// 1-based running order.
    pub position: u32,
    pub status: QueueStatus,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

impl QueueEntry {
    pub fn is_performing(&self) -> bool {
        self.status == QueueStatus::Performing
    }
}

/// Outcome of [`QueueStore::advance_stage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageAdvance {
    /// `retired` (if any) is done and `current` is now performing.
    Promoted {
        retired: Option<QueueEntry>,
        current: QueueEntry,
    },
    /// `retired` (if any) is done and nobody is left to promote.
    Exhausted { retired: Option<QueueEntry> },
    /// The performer on stage was not the expected one; nothing changed.
    Stale { current: Option<QueueEntry> },
}

pub trait QueueStore {
    /// Atomically delete the whole (season, episode) queue and insert `entries`.
    fn replace_queue(
        &self,
        season: &SeasonId,
        episode: Episode,
        entries: &[QueueEntry],
    ) -> Result<(), StoreError>;

    /// The (season, episode) queue ordered by position.
    fn list_queue(&self, season: &SeasonId, episode: Episode)
        -> Result<Vec<QueueEntry>, StoreError>;

    /// The entry currently performing, if any.
    fn current_performer(
        &self,
        season: &SeasonId,
        episode: Episode,
    ) -> Result<Option<QueueEntry>, StoreError> {
        Ok(self
            .list_queue(season, episode)?
            .into_iter()
            .find(QueueEntry::is_performing))
    }

    /// Retire the current performer and promote the lowest pending entry, as
    /// one transaction.
    ///
    /// Runs only if the entry performing right now has id `expected`
    /// (`None` meaning nobody is performing); otherwise returns
    /// [`StageAdvance::Stale`] without writing.
    fn advance_stage(
        &self,
        season: &SeasonId,
        episode: Episode,
        expected: Option<QueueEntryId>,
        now: Timestamp,
    ) -> Result<StageAdvance, StoreError>;
}

/// The state change `advance_stage` applies to a position-ordered queue.
///
/// Shared by every backend so the transition rule lives in one place; the
/// backend supplies the transaction around it. Returns the outcome and the
/// entries that were modified.
pub fn plan_advance(
    queue: &[QueueEntry],
    expected: Option<QueueEntryId>,
    now: Timestamp,
) -> (StageAdvance, Vec<QueueEntry>) {
    let current = queue.iter().find(|e| e.is_performing()).cloned();
    if current.as_ref().map(|e| e.id) != expected {
        return (StageAdvance::Stale { current }, Vec::new());
    }

    let mut changed = Vec::new();
    let retired = current.map(|mut entry| {
        entry.status = QueueStatus::Done;
        entry.ended_at = Some(now);
        changed.push(entry.clone());
        entry
    });

    let next = queue
        .iter()
        .filter(|e| e.status == QueueStatus::Pending)
        .min_by_key(|e| e.position)
        .cloned();

    let outcome = match next {
        Some(mut entry) => {
            entry.status = QueueStatus::Performing;
            entry.started_at = Some(now);
            changed.push(entry.clone());
            StageAdvance::Promoted {
                retired,
                current: entry,
            }
        }
        None => StageAdvance::Exhausted { retired },
    };
    (outcome, changed)
}
