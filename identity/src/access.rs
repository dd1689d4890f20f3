//! Role resolution and admin management.

use std::sync::Arc;

use agt_crypto::parse_address;
use agt_store::{AdminRecord, ArenaStore};
use agt_types::{Clock, Role, WalletAddress};
use serde::Serialize;
use tracing::{info, warn};

use crate::{IdentityError, SessionIssuer};

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub address: WalletAddress,
    pub role: Role,
}

/// Turns bearer tokens into principals and enforces role requirements.
pub struct AccessControl {
    store: Arc<dyn ArenaStore>,
    sessions: Arc<SessionIssuer>,
    clock: Arc<dyn Clock>,
}

impl AccessControl {
    pub fn new(
        store: Arc<dyn ArenaStore>,
        sessions: Arc<SessionIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            sessions,
            clock,
        }
    }

    /// The role held by `address`; wallets outside the admin table are participants.
    pub fn role_of(&self, address: &WalletAddress) -> Result<Role, IdentityError> {
        Ok(self
            .store
            .get_admin(address)?
            .map(|admin| admin.role)
            .unwrap_or(Role::Participant))
    }

    pub fn authenticate(&self, token: Option<&str>) -> Result<Principal, IdentityError> {
        let address = self.sessions.verify(token)?;
        let role = self.role_of(&address)?;
        Ok(Principal { address, role })
    }

    pub fn require_admin(&self, token: Option<&str>) -> Result<Principal, IdentityError> {
        let principal = self.authenticate(token)?;
        if !principal.role.can_administer() {
            warn!(address = %principal.address, "admin action refused");
            return Err(IdentityError::NotAnAdmin);
        }
        Ok(principal)
    }

    pub fn require_super_admin(&self, token: Option<&str>) -> Result<Principal, IdentityError> {
        let principal = self.authenticate(token)?;
        if !principal.role.can_manage_admins() {
            warn!(address = %principal.address, "super admin action refused");
            return Err(IdentityError::NotASuperAdmin);
        }
        Ok(principal)
    }

    /// Set the role of `raw_address`. Granting `Participant` removes the admin row.
    ///
    /// Returns the stored admin row, or `None` after a removal.
    pub fn grant_admin(
        &self,
        granter: &Principal,
        raw_address: &str,
        role: Role,
    ) -> Result<Option<AdminRecord>, IdentityError> {
        if !granter.role.can_manage_admins() {
            return Err(IdentityError::NotASuperAdmin);
        }
        let address = parse_address(raw_address)?;

        if role == Role::Participant {
            let removed = self.store.delete_admin(&address)?;
            info!(address = %address, by = %granter.address, removed, "revoked admin role");
            return Ok(None);
        }

        let record = AdminRecord {
            address,
            role,
            granted_by: Some(granter.address.clone()),
            granted_at: self.clock.now(),
        };
        self.store.put_admin(&record)?;
        info!(address = %record.address, role = %role, by = %granter.address, "granted admin role");
        Ok(Some(record))
    }

    /// Make sure every configured address is a super admin. Returns how many
    /// rows were written.
    pub fn seed_super_admins(&self, addresses: &[String]) -> Result<usize, IdentityError> {
        let mut written = 0;
        for raw in addresses {
            let address = parse_address(raw)?;
            if self.role_of(&address)? == Role::SuperAdmin {
                continue;
            }
            self.store.put_admin(&AdminRecord {
                address: address.clone(),
                role: Role::SuperAdmin,
                granted_by: None,
                granted_at: self.clock.now(),
            })?;
            info!(address = %address, "seeded super admin from configuration");
            written += 1;
        }
        Ok(written)
    }

    pub fn list_admins(&self) -> Result<Vec<AdminRecord>, IdentityError> {
        Ok(self.store.list_admins()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agt_crypto::{derive_address, keypair_from_seed};
    use agt_nullables::{NullClock, NullStore};

    struct Setup {
        access: AccessControl,
        sessions: Arc<SessionIssuer>,
    }

    fn setup() -> Setup {
        let store = Arc::new(NullStore::new());
        let clock = Arc::new(NullClock::new(10));
        let sessions = Arc::new(SessionIssuer::new(b"s".to_vec(), clock.clone(), 3_600));
        Setup {
            access: AccessControl::new(store, sessions.clone(), clock),
            sessions,
        }
    }

    fn wallet(seed: u8) -> WalletAddress {
        derive_address(&keypair_from_seed(&[seed; 32]).public)
    }

    fn token(s: &Setup, address: &WalletAddress) -> String {
        s.sessions.issue(address).unwrap().token
    }

    #[test]
    fn participants_are_not_admins() {
        let s = setup();
        let t = token(&s, &wallet(1));
        assert_eq!(
            s.access.authenticate(Some(&t)).unwrap().role,
            Role::Participant
        );
        assert!(matches!(
            s.access.require_admin(Some(&t)),
            Err(IdentityError::NotAnAdmin)
        ));
    }

    #[test]
    fn seeded_super_admin_can_grant_admins() {
        let s = setup();
        let root = wallet(1);
        let helper = wallet(2);
        assert_eq!(s.access.seed_super_admins(&[root.to_string()]).unwrap(), 1);
        assert_eq!(s.access.seed_super_admins(&[root.to_string()]).unwrap(), 0);

        let root_principal = s.access.require_super_admin(Some(&token(&s, &root))).unwrap();
        s.access
            .grant_admin(&root_principal, helper.as_str(), Role::Admin)
            .unwrap();

        let helper_token = token(&s, &helper);
        let helper_principal = s.access.require_admin(Some(&helper_token)).unwrap();
        assert!(matches!(
            s.access.require_super_admin(Some(&helper_token)),
            Err(IdentityError::NotASuperAdmin)
        ));
        assert!(matches!(
            s.access
                .grant_admin(&helper_principal, wallet(3).as_str(), Role::Admin),
            Err(IdentityError::NotASuperAdmin)
        ));

        s.access
            .grant_admin(&root_principal, helper.as_str(), Role::Participant)
            .unwrap();
        assert_eq!(s.access.role_of(&helper).unwrap(), Role::Participant);
    }

    #[test]
    fn missing_token_fails_authentication() {
        let s = setup();
        assert!(matches!(
            s.access.require_admin(None),
            Err(IdentityError::MissingCredential)
        ));
    }
}
