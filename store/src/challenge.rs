//! Sign-in challenge storage trait.

use crate::StoreError;
use agt_types::{Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Most superseded messages remembered per address.
pub const MAX_SUPERSEDED: usize = 8;

/// A challenge that was replaced before anyone redeemed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersededChallenge {
    pub message: String,
    pub expires_at: Timestamp,
}

/// A pending proof-of-ownership challenge. At most one per address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub address: WalletAddress,
    pub nonce: String,
    /// The exact text the wallet must sign.
    pub message: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    /// Earlier, still unexpired challenges this one replaced, newest first.
    /// A signature over one of them is stale rather than invalid.
    pub superseded: Vec<SupersededChallenge>,
}

impl ChallengeRecord {
    /// Expired strictly after `expires_at`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    /// This record as stored on top of `previous`: the previous message joins
    /// the superseded list, and entries expired at `issued_at` are dropped.
    pub fn superseding(&self, previous: Option<&ChallengeRecord>) -> ChallengeRecord {
        let mut record = self.clone();
        if let Some(previous) = previous {
            record.superseded = std::iter::once(SupersededChallenge {
                message: previous.message.clone(),
                expires_at: previous.expires_at,
            })
            .chain(previous.superseded.iter().cloned())
            .filter(|old| old.expires_at >= record.issued_at)
            .take(MAX_SUPERSEDED)
            .collect();
        }
        record
    }
}

pub trait ChallengeStore {
    /// Store `record` as the only challenge for its address, atomically
    /// replacing any previous one (which is returned). The stored row is
    /// `record.superseding(previous)`.
    fn replace_challenge(
        &self,
        record: &ChallengeRecord,
    ) -> Result<Option<ChallengeRecord>, StoreError>;

    /// Atomically read and delete the challenge for `address`.
    ///
    /// Of two concurrent callers at most one receives the row.
    fn take_challenge(&self, address: &WalletAddress)
        -> Result<Option<ChallengeRecord>, StoreError>;

    fn get_challenge(&self, address: &WalletAddress)
        -> Result<Option<ChallengeRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(nonce: &str, issued_at: u64) -> ChallengeRecord {
        ChallengeRecord {
            address: WalletAddress::new(format!("agt_{}", "3".repeat(60))),
            nonce: nonce.into(),
            message: format!("Nonce: {nonce}"),
            issued_at: Timestamp::new(issued_at),
            expires_at: Timestamp::new(issued_at + 300),
            superseded: Vec::new(),
        }
    }

    #[test]
    fn superseding_remembers_unexpired_messages() {
        let first = challenge("a", 0);
        let second = challenge("b", 100).superseding(Some(&first));
        let third = challenge("c", 350).superseding(Some(&second));

        assert_eq!(second.superseded.len(), 1);
        assert_eq!(second.superseded[0].message, "Nonce: a");
        // "a" expired at 300, before "c" was issued.
        let kept: Vec<_> = third.superseded.iter().map(|s| s.message.as_str()).collect();
        assert_eq!(kept, ["Nonce: b"]);
    }

    #[test]
    fn superseded_list_is_bounded() {
        let mut current = challenge("0", 0);
        for i in 1..20 {
            current = challenge(&i.to_string(), i).superseding(Some(&current));
        }
        assert_eq!(current.superseded.len(), MAX_SUPERSEDED);
        assert_eq!(current.superseded[0].message, "Nonce: 18");
    }
}
