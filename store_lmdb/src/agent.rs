//! LMDB implementation of AgentStore.

use agt_store::{AgentRecord, AgentStore, StoreError};
use agt_types::{AgentId, WalletAddress};

use crate::environment::{encode, get_decoded, LmdbStore};
use crate::LmdbError;

impl AgentStore for LmdbStore {
    fn get_agent(&self, id: &AgentId) -> Result<AgentRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        get_decoded(&self.agents_db, &rtxn, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("agent {id}")))
    }

    fn find_agent_by_address(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<AgentRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(id) = self
            .agent_addresses_db
            .get(&rtxn, address.as_str().as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        Ok(get_decoded(&self.agents_db, &rtxn, id)?)
    }

    fn create_agent(&self, record: &AgentRecord) -> Result<AgentRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let address_key = record.address.as_str().as_bytes();

        let existing_id = self
            .agent_addresses_db
            .get(&wtxn, address_key)
            .map_err(LmdbError::from)?
            .map(<[u8]>::to_vec);
        if let Some(id) = existing_id {
            if let Some(existing) = get_decoded::<AgentRecord>(&self.agents_db, &wtxn, &id)? {
                return Ok(existing);
            }
        }

        self.agents_db
            .put(&mut wtxn, record.id.as_bytes(), &encode(record)?)
            .map_err(LmdbError::from)?;
        self.agent_addresses_db
            .put(&mut wtxn, address_key, record.id.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(record.clone())
    }

    fn update_agent(&self, record: &AgentRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let exists = self
            .agents_db
            .get(&wtxn, record.id.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound(format!("agent {}", record.id)));
        }
        self.agents_db
            .put(&mut wtxn, record.id.as_bytes(), &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::test_support::{addr, temp_store};
    use agt_types::Timestamp;

    fn agent(c: char, name: &str) -> AgentRecord {
        AgentRecord {
            id: AgentId::new_random(),
            address: addr(c),
            display_name: name.into(),
            description: None,
            website: None,
            registered_at: Timestamp::new(1),
            updated_at: Timestamp::new(1),
        }
    }

    #[test]
    fn create_find_and_update() {
        let (_dir, store) = temp_store();
        let rec = agent('1', "ada");
        store.create_agent(&rec).unwrap();

        let found = store.find_agent_by_address(&rec.address).unwrap().unwrap();
        assert_eq!(found, rec);

        let mut updated = rec.clone();
        updated.display_name = "ada v2".into();
        store.update_agent(&updated).unwrap();
        assert_eq!(store.get_agent(&rec.id).unwrap().display_name, "ada v2");
    }

    #[test]
    fn create_is_idempotent_per_address() {
        let (_dir, store) = temp_store();
        let first = agent('3', "first");
        store.create_agent(&first).unwrap();
        let stored = store.create_agent(&agent('3', "second")).unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[test]
    fn update_unknown_is_not_found() {
        let (_dir, store) = temp_store();
        let err = store.update_agent(&agent('4', "ghost")).unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.agent_exists(&AgentId::new_random()).unwrap());
    }
}
