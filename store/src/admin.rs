//! Admin allowlist storage trait.

use crate::StoreError;
use agt_types::{Role, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// A wallet holding an administrative role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub address: WalletAddress,
    /// `Admin` or `SuperAdmin`; participants are never stored.
    pub role: Role,
    /// `None` for admins seeded from configuration.
    pub granted_by: Option<WalletAddress>,
    pub granted_at: Timestamp,
}

pub trait AdminStore {
    fn get_admin(&self, address: &WalletAddress) -> Result<Option<AdminRecord>, StoreError>;
    fn put_admin(&self, record: &AdminRecord) -> Result<(), StoreError>;
    /// Returns whether a row was removed.
    fn delete_admin(&self, address: &WalletAddress) -> Result<bool, StoreError>;
    fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError>;
}
