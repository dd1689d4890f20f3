//! Nullable store: thread-safe in-memory storage.
//!
//! Every table lives behind one mutex, so each trait method is trivially a
//! single atomic step.

use agt_store::judge::{apply_judge_score, enroll_judge};
use agt_store::queue::plan_advance;
use agt_store::score::sort_newest_first;
use agt_store::{
    AdminRecord, AdminStore, AgentRecord, AgentStore, AuditionRecord, AuditionStore, AuditionUpsert,
    ChallengeRecord, ChallengeStore, JudgeRecord, JudgeStore, PerformanceRecord, PerformanceStore,
    QueueEntry, QueueStore, ScoreRecord, ScoreStore, SeasonRecord, SeasonStore, StageAdvance,
    StoreError,
};
use agt_types::{
    AgentId, AuditionId, Episode, PerformanceId, QueueEntryId, SeasonId, SeasonPhase, Timestamp,
    WalletAddress,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    agents: HashMap<AgentId, AgentRecord>,
    agents_by_address: HashMap<WalletAddress, AgentId>,
    admins: BTreeMap<WalletAddress, AdminRecord>,
    challenges: HashMap<WalletAddress, ChallengeRecord>,
    seasons: HashMap<SeasonId, SeasonRecord>,
    auditions: HashMap<(SeasonId, AgentId), AuditionRecord>,
    audition_ids: HashMap<AuditionId, (SeasonId, AgentId)>,
    judges: BTreeMap<(SeasonId, WalletAddress), JudgeRecord>,
    queues: HashMap<(SeasonId, Episode), Vec<QueueEntry>>,
    performances: HashMap<(SeasonId, AgentId, Episode), PerformanceRecord>,
    performance_ids: HashMap<PerformanceId, (SeasonId, AgentId, Episode)>,
    scores: HashMap<(SeasonId, AgentId, WalletAddress), ScoreRecord>,
}

type Interleaved = Box<dyn FnOnce(&NullStore) + Send>;

/// An in-memory implementation of every arena store trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    interleaved: Mutex<Option<Interleaved>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("null store mutex poisoned".into()))
    }

    /// Run `write` just before the next conditional write (`replace_season_if`,
    /// `upsert_audition`, `update_audition_if`), as if another caller got
    /// there between a service's read and its write.
    pub fn interleave(&self, write: impl FnOnce(&NullStore) + Send + 'static) {
        if let Ok(mut slot) = self.interleaved.lock() {
            *slot = Some(Box::new(write));
        }
    }

    fn run_interleaved(&self) {
        let pending = self.interleaved.lock().ok().and_then(|mut slot| slot.take());
        if let Some(write) = pending {
            write(self);
        }
    }

    /// Number of stored challenges (for assertions on single-use semantics).
    pub fn challenge_count(&self) -> usize {
        self.tables().map(|t| t.challenges.len()).unwrap_or(0)
    }
}

impl AgentStore for NullStore {
    fn get_agent(&self, id: &AgentId) -> Result<AgentRecord, StoreError> {
        self.tables()?
            .agents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("agent {id}")))
    }

    fn find_agent_by_address(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<AgentRecord>, StoreError> {
        let t = self.tables()?;
        Ok(t
            .agents_by_address
            .get(address)
            .and_then(|id| t.agents.get(id))
            .cloned())
    }

    fn create_agent(&self, record: &AgentRecord) -> Result<AgentRecord, StoreError> {
        let mut t = self.tables()?;
        if let Some(existing) = t
            .agents_by_address
            .get(&record.address)
            .and_then(|id| t.agents.get(id))
        {
            return Ok(existing.clone());
        }
        t.agents_by_address
            .insert(record.address.clone(), record.id);
        t.agents.insert(record.id, record.clone());
        Ok(record.clone())
    }

    fn update_agent(&self, record: &AgentRecord) -> Result<(), StoreError> {
        let mut t = self.tables()?;
        match t.agents.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("agent {}", record.id))),
        }
    }
}

impl AdminStore for NullStore {
    fn get_admin(&self, address: &WalletAddress) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.tables()?.admins.get(address).cloned())
    }

    fn put_admin(&self, record: &AdminRecord) -> Result<(), StoreError> {
        self.tables()?
            .admins
            .insert(record.address.clone(), record.clone());
        Ok(())
    }

    fn delete_admin(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        Ok(self.tables()?.admins.remove(address).is_some())
    }

    fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        Ok(self.tables()?.admins.values().cloned().collect())
    }
}

impl ChallengeStore for NullStore {
    fn replace_challenge(
        &self,
        record: &ChallengeRecord,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        let mut t = self.tables()?;
        let stored = record.superseding(t.challenges.get(&record.address));
        Ok(t.challenges.insert(record.address.clone(), stored))
    }

    fn take_challenge(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        Ok(self.tables()?.challenges.remove(address))
    }

    fn get_challenge(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<ChallengeRecord>, StoreError> {
        Ok(self.tables()?.challenges.get(address).cloned())
    }
}

impl SeasonStore for NullStore {
    fn get_season(&self, id: &SeasonId) -> Result<SeasonRecord, StoreError> {
        self.tables()?
            .seasons
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("season {id}")))
    }

    fn put_season(&self, record: &SeasonRecord) -> Result<(), StoreError> {
        self.tables()?.seasons.insert(record.id, record.clone());
        Ok(())
    }

    fn list_seasons(&self) -> Result<Vec<SeasonRecord>, StoreError> {
        let mut seasons: Vec<_> = self.tables()?.seasons.values().cloned().collect();
        seasons.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(seasons)
    }

    fn replace_season_if(
        &self,
        record: &SeasonRecord,
        expected: SeasonPhase,
    ) -> Result<bool, StoreError> {
        self.run_interleaved();
        let mut t = self.tables()?;
        let slot = t
            .seasons
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::NotFound(format!("season {}", record.id)))?;
        if slot.phase != expected {
            return Ok(false);
        }
        *slot = record.clone();
        Ok(true)
    }
}

impl AuditionStore for NullStore {
    fn get_audition(&self, id: &AuditionId) -> Result<AuditionRecord, StoreError> {
        let t = self.tables()?;
        t.audition_ids
            .get(id)
            .and_then(|key| t.auditions.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("audition {id}")))
    }

    fn find_audition(
        &self,
        season: &SeasonId,
        agent: &AgentId,
    ) -> Result<Option<AuditionRecord>, StoreError> {
        Ok(self.tables()?.auditions.get(&(*season, *agent)).cloned())
    }

    fn upsert_audition(&self, record: &AuditionRecord) -> Result<AuditionUpsert, StoreError> {
        self.run_interleaved();
        let mut t = self.tables()?;
        let key = (record.season_id, record.agent_id);
        let mut stored = record.clone();
        if let Some(existing) = t.auditions.get(&key) {
            if existing.status.is_decided() {
                return Ok(AuditionUpsert::Decided(existing.clone()));
            }
            stored.id = existing.id;
            stored.submitted_at = existing.submitted_at;
        }
        t.audition_ids.insert(stored.id, key);
        t.auditions.insert(key, stored.clone());
        Ok(AuditionUpsert::Stored(stored))
    }

    fn update_audition_if(
        &self,
        record: &AuditionRecord,
        expected: &AuditionRecord,
    ) -> Result<bool, StoreError> {
        self.run_interleaved();
        let mut t = self.tables()?;
        let key = t
            .audition_ids
            .get(&record.id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("audition {}", record.id)))?;
        let Some(slot) = t.auditions.get_mut(&key) else {
            return Err(StoreError::NotFound(format!("audition {}", record.id)));
        };
        if slot != expected {
            return Ok(false);
        }
        *slot = record.clone();
        Ok(true)
    }

    fn list_auditions(&self, season: &SeasonId) -> Result<Vec<AuditionRecord>, StoreError> {
        let mut list: Vec<_> = self
            .tables()?
            .auditions
            .values()
            .filter(|a| a.season_id == *season)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }
}

impl JudgeStore for NullStore {
    fn get_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError> {
        Ok(self
            .tables()?
            .judges
            .get(&(*season, address.clone()))
            .cloned())
    }

    fn upsert_judge(&self, record: &JudgeRecord) -> Result<JudgeRecord, StoreError> {
        let mut t = self.tables()?;
        let key = (record.season_id, record.address.clone());
        let stored = enroll_judge(t.judges.remove(&key), record);
        t.judges.insert(key, stored.clone());
        Ok(stored)
    }

    fn deactivate_judge(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
    ) -> Result<Option<JudgeRecord>, StoreError> {
        let mut t = self.tables()?;
        Ok(t
            .judges
            .get_mut(&(*season, address.clone()))
            .filter(|j| j.active)
            .map(|j| {
                j.active = false;
                j.clone()
            }))
    }

    fn list_judges(&self, season: &SeasonId) -> Result<Vec<JudgeRecord>, StoreError> {
        Ok(self
            .tables()?
            .judges
            .values()
            .filter(|j| j.season_id == *season)
            .cloned()
            .collect())
    }

    fn record_judge_score(
        &self,
        season: &SeasonId,
        address: &WalletAddress,
        score: u8,
        replaced: Option<u8>,
    ) -> Result<JudgeRecord, StoreError> {
        let mut t = self.tables()?;
        let judge = t
            .judges
            .get_mut(&(*season, address.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("judge {address}")))?;
        apply_judge_score(judge, score, replaced);
        Ok(judge.clone())
    }
}

impl QueueStore for NullStore {
    fn replace_queue(
        &self,
        season: &SeasonId,
        episode: Episode,
        entries: &[QueueEntry],
    ) -> Result<(), StoreError> {
        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|e| e.position);
        self.tables()?.queues.insert((*season, episode), sorted);
        Ok(())
    }

    fn list_queue(
        &self,
        season: &SeasonId,
        episode: Episode,
    ) -> Result<Vec<QueueEntry>, StoreError> {
        Ok(self
            .tables()?
            .queues
            .get(&(*season, episode))
            .cloned()
            .unwrap_or_default())
    }

    fn advance_stage(
        &self,
        season: &SeasonId,
        episode: Episode,
        expected: Option<QueueEntryId>,
        now: Timestamp,
    ) -> Result<StageAdvance, StoreError> {
        let mut t = self.tables()?;
        let queue = t.queues.entry((*season, episode)).or_default();
        let (outcome, changed) = plan_advance(queue, expected, now);
        for entry in changed {
            if let Some(slot) = queue.iter_mut().find(|e| e.id == entry.id) {
                *slot = entry;
            }
        }
        Ok(outcome)
    }
}

impl PerformanceStore for NullStore {
    fn get_performance(&self, id: &PerformanceId) -> Result<PerformanceRecord, StoreError> {
        let t = self.tables()?;
        t.performance_ids
            .get(id)
            .and_then(|key| t.performances.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("performance {id}")))
    }

    fn find_performance(
        &self,
        season: &SeasonId,
        agent: &AgentId,
        episode: Episode,
    ) -> Result<Option<PerformanceRecord>, StoreError> {
        Ok(self
            .tables()?
            .performances
            .get(&(*season, *agent, episode))
            .cloned())
    }

    fn upsert_performance(
        &self,
        record: &PerformanceRecord,
    ) -> Result<PerformanceRecord, StoreError> {
        let mut t = self.tables()?;
        let key = (record.season_id, record.agent_id, record.episode);
        let mut stored = record.clone();
        if let Some(existing) = t.performances.get(&key) {
            stored.id = existing.id;
            stored.created_at = existing.created_at;
        }
        t.performance_ids.insert(stored.id, key);
        t.performances.insert(key, stored.clone());
        Ok(stored)
    }
}

impl ScoreStore for NullStore {
    fn upsert_score(&self, record: &ScoreRecord) -> Result<Option<ScoreRecord>, StoreError> {
        let mut t = self.tables()?;
        let key = (record.season_id, record.agent_id, record.judge.clone());
        let mut stored = record.clone();
        let previous = t.scores.get(&key).cloned();
        if let Some(existing) = &previous {
            stored.created_at = existing.created_at;
        }
        t.scores.insert(key, stored);
        Ok(previous)
    }

    fn list_scores(
        &self,
        season: &SeasonId,
        agent: &AgentId,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut scores: Vec<_> = self
            .tables()?
            .scores
            .values()
            .filter(|s| s.season_id == *season && s.agent_id == *agent)
            .cloned()
            .collect();
        sort_newest_first(&mut scores);
        Ok(scores)
    }
}
