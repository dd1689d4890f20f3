//! LMDB implementation of AdminStore.

use agt_store::{AdminRecord, AdminStore, StoreError};
use agt_types::WalletAddress;

use crate::environment::{encode, get_decoded, scan_prefix_decoded, LmdbStore};
use crate::LmdbError;

impl AdminStore for LmdbStore {
    fn get_admin(&self, address: &WalletAddress) -> Result<Option<AdminRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(get_decoded(&self.admins_db, &rtxn, address.as_str().as_bytes())?)
    }

    fn put_admin(&self, record: &AdminRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.admins_db
            .put(&mut wtxn, record.address.as_str().as_bytes(), &encode(record)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_admin(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .admins_db
            .delete(&mut wtxn, address.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }

    fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(scan_prefix_decoded(&self.admins_db, &rtxn, &[])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::test_support::{addr, temp_store};
    use agt_types::{Role, Timestamp};

    #[test]
    fn put_list_delete() {
        let (_dir, store) = temp_store();
        for (c, role) in [('1', Role::Admin), ('3', Role::SuperAdmin)] {
            store
                .put_admin(&AdminRecord {
                    address: addr(c),
                    role,
                    granted_by: None,
                    granted_at: Timestamp::new(0),
                })
                .unwrap();
        }
        assert_eq!(store.list_admins().unwrap().len(), 2);
        assert_eq!(
            store.get_admin(&addr('3')).unwrap().unwrap().role,
            Role::SuperAdmin
        );
        assert!(store.delete_admin(&addr('1')).unwrap());
        assert!(store.get_admin(&addr('1')).unwrap().is_none());
    }
}
