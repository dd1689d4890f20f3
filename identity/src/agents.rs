//! Agent registration.

use std::sync::Arc;

use agt_store::{AgentRecord, ArenaStore};
use agt_types::{AgentId, Clock, WalletAddress};
use tracing::info;

use crate::IdentityError;

/// Profile fields an agent controls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentProfile {
    pub display_name: String,
    pub description: Option<String>,
    pub website: Option<String>,
}

pub struct AgentRegistry {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AgentRegistry {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create the agent for `address`, or overwrite its profile if it exists.
    ///
    /// Returns the stored agent and whether it was newly created.
    pub fn register(
        &self,
        address: &WalletAddress,
        profile: AgentProfile,
    ) -> Result<(AgentRecord, bool), IdentityError> {
        let display_name = profile.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(IdentityError::MissingName);
        }
        let description = non_blank(profile.description);
        let website = non_blank(profile.website);
        let now = self.clock.now();

        let candidate = AgentRecord {
            id: AgentId::new_random(),
            address: address.clone(),
            display_name: display_name.clone(),
            description: description.clone(),
            website: website.clone(),
            registered_at: now,
            updated_at: now,
        };
        let stored = self.store.create_agent(&candidate)?;
        if stored.id == candidate.id {
            info!(agent = %stored.id, address = %address, "agent registered");
            return Ok((stored, true));
        }

        let updated = AgentRecord {
            display_name,
            description,
            website,
            updated_at: now,
            ..stored
        };
        self.store.update_agent(&updated)?;
        info!(agent = %updated.id, address = %address, "agent profile updated");
        Ok((updated, false))
    }

    /// The agent for `address`, creating a bare one named `display_name` if
    /// none exists. An existing profile is left untouched.
    pub fn ensure(
        &self,
        address: &WalletAddress,
        display_name: &str,
    ) -> Result<AgentRecord, IdentityError> {
        if let Some(existing) = self.store.find_agent_by_address(address)? {
            return Ok(existing);
        }
        let name = display_name.trim();
        if name.is_empty() {
            return Err(IdentityError::MissingName);
        }
        let now = self.clock.now();
        let stored = self.store.create_agent(&AgentRecord {
            id: AgentId::new_random(),
            address: address.clone(),
            display_name: name.to_string(),
            description: None,
            website: None,
            registered_at: now,
            updated_at: now,
        })?;
        Ok(stored)
    }

    pub fn find(&self, address: &WalletAddress) -> Result<Option<AgentRecord>, IdentityError> {
        Ok(self.store.find_agent_by_address(address)?)
    }

    /// The agent for `address`, or `AgentNotRegistered`.
    pub fn require(&self, address: &WalletAddress) -> Result<AgentRecord, IdentityError> {
        self.find(address)?
            .ok_or_else(|| IdentityError::AgentNotRegistered(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agt_nullables::{NullClock, NullStore};

    fn registry() -> (Arc<NullClock>, AgentRegistry) {
        let clock = Arc::new(NullClock::new(100));
        let registry = AgentRegistry::new(Arc::new(NullStore::new()), clock.clone());
        (clock, registry)
    }

    fn address() -> WalletAddress {
        WalletAddress::new(format!("agt_{}", "9".repeat(60)))
    }

    fn profile(name: &str) -> AgentProfile {
        AgentProfile {
            display_name: name.into(),
            description: Some("writes haiku".into()),
            website: None,
        }
    }

    #[test]
    fn register_creates_then_updates() {
        let (clock, registry) = registry();
        let (created, fresh) = registry.register(&address(), profile("Basho")).unwrap();
        assert!(fresh);

        clock.advance(50);
        let (updated, fresh) = registry
            .register(
                &address(),
                AgentProfile {
                    display_name: "Basho II".into(),
                    description: None,
                    website: Some("https://basho.example".into()),
                },
            )
            .unwrap();
        assert!(!fresh);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.display_name, "Basho II");
        assert_eq!(updated.description, None);
        assert_eq!(updated.registered_at.as_secs(), 100);
        assert_eq!(updated.updated_at.as_secs(), 150);
    }

    #[test]
    fn blank_name_is_rejected() {
        let (_, registry) = registry();
        assert!(matches!(
            registry.register(&address(), profile("   ")),
            Err(IdentityError::MissingName)
        ));
    }

    #[test]
    fn ensure_keeps_existing_profile() {
        let (_, registry) = registry();
        let (created, _) = registry.register(&address(), profile("Basho")).unwrap();
        let ensured = registry.ensure(&address(), "Someone else").unwrap();
        assert_eq!(ensured.id, created.id);
        assert_eq!(ensured.display_name, "Basho");
    }

    #[test]
    fn require_unknown_agent() {
        let (_, registry) = registry();
        assert!(matches!(
            registry.require(&address()),
            Err(IdentityError::AgentNotRegistered(_))
        ));
    }
}
