//! LMDB environment setup and the helpers every table module shares.

use std::ops::Bound;
use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use agt_types::{AgentId, Episode, SeasonId, WalletAddress};

use crate::LmdbError;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 16;

/// Wraps the LMDB environment and all database handles.
///
/// Key layouts (all ids are the 16 raw UUID bytes):
/// - `agents`: agent_id → AgentRecord
/// - `agent_addresses`: address → agent_id
/// - `admins`: address → AdminRecord
/// - `challenges`: address → ChallengeRecord
/// - `seasons`: season_id → SeasonRecord
/// - `auditions`: season_id ++ agent_id → AuditionRecord
/// - `audition_ids`: audition_id → season_id ++ agent_id
/// - `judges`: season_id ++ address → JudgeRecord
/// - `queue`: season_id ++ episode(1) ++ position_be_u32(4) → QueueEntry
/// - `performances`: season_id ++ agent_id ++ episode(1) → PerformanceRecord
/// - `performance_ids`: performance_id → season_id ++ agent_id ++ episode(1)
/// - `scores`: season_id ++ agent_id ++ judge address → ScoreRecord
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Env,
    pub(crate) agents_db: Database<Bytes, Bytes>,
    pub(crate) agent_addresses_db: Database<Bytes, Bytes>,
    pub(crate) admins_db: Database<Bytes, Bytes>,
    pub(crate) challenges_db: Database<Bytes, Bytes>,
    pub(crate) seasons_db: Database<Bytes, Bytes>,
    pub(crate) auditions_db: Database<Bytes, Bytes>,
    pub(crate) audition_ids_db: Database<Bytes, Bytes>,
    pub(crate) judges_db: Database<Bytes, Bytes>,
    pub(crate) queue_db: Database<Bytes, Bytes>,
    pub(crate) performances_db: Database<Bytes, Bytes>,
    pub(crate) performance_ids_db: Database<Bytes, Bytes>,
    pub(crate) scores_db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and per path;
        // the node owns the data directory exclusively.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let agents_db = env.create_database(&mut wtxn, Some("agents"))?;
        let agent_addresses_db = env.create_database(&mut wtxn, Some("agent_addresses"))?;
        let admins_db = env.create_database(&mut wtxn, Some("admins"))?;
        let challenges_db = env.create_database(&mut wtxn, Some("challenges"))?;
        let seasons_db = env.create_database(&mut wtxn, Some("seasons"))?;
        let auditions_db = env.create_database(&mut wtxn, Some("auditions"))?;
        let audition_ids_db = env.create_database(&mut wtxn, Some("audition_ids"))?;
        let judges_db = env.create_database(&mut wtxn, Some("judges"))?;
        let queue_db = env.create_database(&mut wtxn, Some("queue"))?;
        let performances_db = env.create_database(&mut wtxn, Some("performances"))?;
        let performance_ids_db = env.create_database(&mut wtxn, Some("performance_ids"))?;
        let scores_db = env.create_database(&mut wtxn, Some("scores"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            agents_db,
            agent_addresses_db,
            admins_db,
            challenges_db,
            seasons_db,
            auditions_db,
            audition_ids_db,
            judges_db,
            queue_db,
            performances_db,
            performance_ids_db,
            scores_db,
        })
    }
}

// ── Encoding ───────────────────────────────────────────────────────────

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Read and decode one value.
pub(crate) fn get_decoded<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<T>, LmdbError> {
    match db.get(txn, key)? {
        Some(bytes) => Ok(Some(decode(bytes)?)),
        None => Ok(None),
    }
}

// ── Keys ───────────────────────────────────────────────────────────────

pub(crate) fn season_agent_key(season: &SeasonId, agent: &AgentId) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(season.as_bytes());
    key[16..].copy_from_slice(agent.as_bytes());
    key
}

pub(crate) fn season_address_key(season: &SeasonId, address: &WalletAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(16 + address.as_str().len());
    key.extend_from_slice(season.as_bytes());
    key.extend_from_slice(address.as_str().as_bytes());
    key
}

pub(crate) fn season_episode_prefix(season: &SeasonId, episode: Episode) -> [u8; 17] {
    let mut key = [0u8; 17];
    key[..16].copy_from_slice(season.as_bytes());
    key[16] = episode.number();
    key
}

// ── Prefix scans ───────────────────────────────────────────────────────

/// Increment a byte string to the smallest value greater than every string
/// it prefixes. Returns `false` if no such value exists (all bytes 0xFF).
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return true;
        }
        prefix.pop();
    }
    false
}

/// Every (key, value) pair whose key starts with `prefix`, in key order.
pub(crate) fn scan_prefix(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LmdbError> {
    let mut upper = prefix.to_vec();
    let upper_bound = if increment_prefix(&mut upper) {
        Bound::Excluded(upper.as_slice())
    } else {
        Bound::Unbounded
    };
    let bounds = (Bound::Included(prefix), upper_bound);
    let iter = db.range(txn, &bounds)?;
    let mut out = Vec::new();
    for result in iter {
        let (key, value) = result?;
        out.push((key.to_vec(), value.to_vec()));
    }
    Ok(out)
}

/// Decode every value under `prefix`.
pub(crate) fn scan_prefix_decoded<T: DeserializeOwned>(
    db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<T>, LmdbError> {
    scan_prefix(db, txn, prefix)?
        .iter()
        .map(|(_, value)| decode(value))
        .collect()
}
