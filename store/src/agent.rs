//! Agent storage trait.

use crate::StoreError;
use agt_types::{AgentId, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// A registered contestant. One agent per wallet address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    /// Canonical lowercase address; never changes after creation.
    pub address: WalletAddress,
    pub display_name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub registered_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Trait for agent storage operations.
pub trait AgentStore {
    fn get_agent(&self, id: &AgentId) -> Result<AgentRecord, StoreError>;

    fn find_agent_by_address(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<AgentRecord>, StoreError>;

    /// Insert `record` unless an agent with the same address exists.
    ///
    /// Returns the stored agent: the existing one when the address was
    /// already registered, otherwise `record` itself.
    fn create_agent(&self, record: &AgentRecord) -> Result<AgentRecord, StoreError>;

    /// Overwrite an existing agent's profile. `NotFound` if the id is unknown.
    fn update_agent(&self, record: &AgentRecord) -> Result<(), StoreError>;

    fn agent_exists(&self, id: &AgentId) -> Result<bool, StoreError> {
        match self.get_agent(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
