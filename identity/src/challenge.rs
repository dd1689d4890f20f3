//! Proof of wallet ownership by signed challenge.
//!
//! Flow: `issue_challenge(address)` stores a fresh nonce-bearing message; the
//! wallet signs that exact message; `redeem(address, signature)` consumes the
//! challenge and checks the signature against the key embedded in the
//! address. The stored row is removed before any verdict, so a challenge can
//! be redeemed at most once whatever the outcome. A signature over a challenge
//! that a newer one replaced counts as "no such challenge", the same as a
//! replay.

use std::sync::Arc;

use agt_crypto::{parse_address, random_nonce_hex, verify_address_signature};
use agt_store::{ArenaStore, ChallengeRecord};
use agt_types::{Clock, Signature, Timestamp, WalletAddress};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::IdentityError;

/// First line of every challenge message.
pub const CHALLENGE_HEADER: &str = "AgentGotTalent Agent Session";

/// The canonical text a wallet signs to prove ownership.
pub fn challenge_message(
    address: &WalletAddress,
    nonce: &str,
    issued_at: Timestamp,
    expires_at: Timestamp,
) -> String {
    [
        CHALLENGE_HEADER.to_string(),
        format!("Address: {address}"),
        format!("Nonce: {nonce}"),
        format!("IssuedAt: {}", issued_at.to_rfc3339()),
        format!("ExpiresAt: {}", expires_at.to_rfc3339()),
    ]
    .join("\n")
}

/// A challenge as handed to the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub address: WalletAddress,
    pub nonce: String,
    pub message: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<ChallengeRecord> for Challenge {
    fn from(record: ChallengeRecord) -> Self {
        Self {
            address: record.address,
            nonce: record.nonce,
            message: record.message,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        }
    }
}

/// Issues and redeems sign-in challenges.
pub struct IdentityVerifier {
    store: Arc<dyn ArenaStore>,
    clock: Arc<dyn Clock>,
    ttl_secs: u64,
}

impl IdentityVerifier {
    pub fn new(store: Arc<dyn ArenaStore>, clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self {
            store,
            clock,
            ttl_secs,
        }
    }

    /// Create a fresh challenge for `raw_address`, replacing any pending one.
    pub fn issue_challenge(&self, raw_address: &str) -> Result<Challenge, IdentityError> {
        let address = parse_address(raw_address)?;
        let issued_at = self.clock.now();
        let expires_at = issued_at.plus_secs(self.ttl_secs);
        let nonce = random_nonce_hex();
        let record = ChallengeRecord {
            message: challenge_message(&address, &nonce, issued_at, expires_at),
            address,
            nonce,
            issued_at,
            expires_at,
            superseded: Vec::new(),
        };

        let replaced = self.store.replace_challenge(&record)?;
        debug!(
            address = %record.address,
            replaced = replaced.is_some(),
            expires_at = %record.expires_at,
            "issued challenge"
        );
        Ok(record.into())
    }

    /// Consume the pending challenge and check `signature_hex` against it.
    ///
    /// Returns the canonical address on success.
    pub fn redeem(
        &self,
        raw_address: &str,
        signature_hex: &str,
    ) -> Result<WalletAddress, IdentityError> {
        let address = parse_address(raw_address)?;
        let challenge = self
            .store
            .take_challenge(&address)?
            .ok_or(IdentityError::ChallengeNotFound)?;

        if challenge.is_expired(self.clock.now()) {
            warn!(address = %address, "challenge redeemed after expiry");
            return Err(IdentityError::ChallengeExpired);
        }

        let signature = Signature::from_hex(signature_hex).ok();
        let signs = |message: &str| {
            signature.as_ref().is_some_and(|sig| {
                verify_address_signature(message.as_bytes(), sig, &challenge.address)
            })
        };
        if !signs(&challenge.message) {
            if challenge.superseded.iter().any(|old| signs(&old.message)) {
                warn!(address = %address, "signature over a superseded challenge");
                return Err(IdentityError::ChallengeNotFound);
            }
            warn!(address = %address, "challenge signature rejected");
            return Err(IdentityError::InvalidSignature);
        }

        info!(address = %address, "wallet ownership proven");
        Ok(challenge.address)
    }
}
