//! The arena node: opens storage and wires every service into an [`Arena`].

use std::sync::Arc;

use tracing::{info, warn};

use agt_crypto::random_bytes;
use agt_nullables::NullStore;
use agt_store::ArenaStore;
use agt_store_lmdb::LmdbStore;
use agt_types::{Clock, SystemClock};

use crate::arena::Arena;
use crate::config::{NodeConfig, StorageBackend};
use crate::error::NodeError;
use crate::metrics::ArenaMetrics;

/// A running arena node.
pub struct ArenaNode {
    pub config: NodeConfig,
    pub arena: Arc<Arena>,
    pub metrics: Arc<ArenaMetrics>,
}

impl ArenaNode {
    /// Open the configured store and build the node on the system clock.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        let store: Arc<dyn ArenaStore> = match config.storage {
            StorageBackend::Lmdb => {
                Arc::new(LmdbStore::open(&config.data_dir, config.lmdb_map_size)?)
            }
            StorageBackend::Memory => {
                warn!("using in-memory storage; all state is lost on exit");
                Arc::new(NullStore::new())
            }
        };
        Self::with_store(config, store, Arc::new(SystemClock))
    }

    /// Build a node over an existing store and clock.
    pub fn with_store(
        config: NodeConfig,
        store: Arc<dyn ArenaStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        let secret = match config.session_secret_bytes()? {
            Some(secret) => secret,
            None => {
                warn!("no session_secret configured; sessions will not survive a restart");
                random_bytes::<32>().to_vec()
            }
        };

        let metrics = Arc::new(ArenaMetrics::new()?);
        let arena = Arc::new(Arena::new(
            store,
            clock,
            &config.params,
            secret,
            metrics.clone(),
        ));

        let seeded = arena.access().seed_super_admins(&config.super_admins)?;
        info!(
            storage = ?config.storage,
            super_admins = config.super_admins.len(),
            seeded,
            "arena node ready"
        );

        Ok(Self {
            config,
            arena,
            metrics,
        })
    }
}
