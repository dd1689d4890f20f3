//! Stateless bearer credentials.
//!
//! A token is `hex(claims_json) "." hex(hmac_sha256(secret, claims_json))`.
//! Nothing is stored server-side: a token stays valid until `exp`, and
//! rotating the secret invalidates every outstanding token.

use std::sync::Arc;

use agt_crypto::{hmac_sha256, parse_address, verify_hmac_sha256};
use agt_types::{Clock, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::IdentityError;

/// Purpose tag carried by agent session tokens.
pub const AGENT_SESSION_PURPOSE: &str = "agt-agent";

/// The claims bound into a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Canonical lowercase wallet address.
    pub sub: String,
    /// Purpose tag; tokens minted for another purpose are refused.
    pub typ: String,
    /// Issued-at, Unix seconds.
    pub iat: u64,
    /// Expiry, Unix seconds.
    pub exp: u64,
}

/// A freshly issued credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub address: WalletAddress,
    pub expires_at: Timestamp,
}

pub struct SessionIssuer {
    secret: Vec<u8>,
    purpose: String,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    /// An issuer of agent session tokens.
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self::with_purpose(secret, clock, ttl_secs, AGENT_SESSION_PURPOSE)
    }

    pub fn with_purpose(
        secret: impl Into<Vec<u8>>,
        clock: Arc<dyn Clock>,
        ttl_secs: u64,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            purpose: purpose.into(),
            ttl_secs,
            clock,
        }
    }

    pub fn issue(&self, address: &WalletAddress) -> Result<SessionGrant, IdentityError> {
        let now = self.clock.now();
        let expires_at = now.plus_secs(self.ttl_secs);
        let claims = SessionClaims {
            sub: address.as_str().to_string(),
            typ: self.purpose.clone(),
            iat: now.as_secs(),
            exp: expires_at.as_secs(),
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|e| IdentityError::Encoding(e.to_string()))?;
        let tag = hmac_sha256(&self.secret, &payload)
            .ok_or_else(|| IdentityError::Encoding("session key rejected".into()))?;
        let token = format!("{}.{}", hex::encode(&payload), hex::encode(tag));

        debug!(address = %address, expires_at = %expires_at, "issued session");
        Ok(SessionGrant {
            token,
            address: address.clone(),
            expires_at,
        })
    }

    /// Check a presented token and return the wallet it was issued to.
    pub fn verify(&self, token: Option<&str>) -> Result<WalletAddress, IdentityError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(IdentityError::MissingCredential)?;
        let claims = self.decode(token)?;

        if self.clock.now().as_secs() >= claims.exp {
            return Err(IdentityError::InvalidCredential);
        }
        if claims.typ != self.purpose {
            return Err(IdentityError::WrongCredentialType);
        }
        parse_address(&claims.sub).map_err(|_| IdentityError::InvalidCredential)
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, IdentityError> {
        let (payload_hex, tag_hex) = token
            .split_once('.')
            .ok_or(IdentityError::InvalidCredential)?;
        let payload = hex::decode(payload_hex).map_err(|_| IdentityError::InvalidCredential)?;
        let tag = hex::decode(tag_hex).map_err(|_| IdentityError::InvalidCredential)?;
        if !verify_hmac_sha256(&self.secret, &payload, &tag) {
            return Err(IdentityError::InvalidCredential);
        }
        serde_json::from_slice(&payload).map_err(|_| IdentityError::InvalidCredential)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; anything else yields `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?.trim();
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agt_crypto::{derive_address, keypair_from_seed};
    use agt_nullables::NullClock;

    const WEEK: u64 = 7 * 24 * 60 * 60;

    fn setup() -> (Arc<NullClock>, SessionIssuer, WalletAddress) {
        let clock = Arc::new(NullClock::new(1_000));
        let issuer = SessionIssuer::new(b"test-secret".to_vec(), clock.clone(), WEEK);
        let address = derive_address(&keypair_from_seed(&[5u8; 32]).public);
        (clock, issuer, address)
    }

    #[test]
    fn issue_then_verify() {
        let (_clock, issuer, address) = setup();
        let grant = issuer.issue(&address).unwrap();
        assert_eq!(grant.expires_at, Timestamp::new(1_000 + WEEK));
        assert_eq!(issuer.verify(Some(&grant.token)).unwrap(), address);
    }

    #[test]
    fn missing_token() {
        let (_clock, issuer, _) = setup();
        assert!(matches!(
            issuer.verify(None),
            Err(IdentityError::MissingCredential)
        ));
        assert!(matches!(
            issuer.verify(Some("   ")),
            Err(IdentityError::MissingCredential)
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let (clock, issuer, address) = setup();
        let grant = issuer.issue(&address).unwrap();
        clock.advance(WEEK);
        assert!(matches!(
            issuer.verify(Some(&grant.token)),
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let (_clock, issuer, address) = setup();
        let grant = issuer.issue(&address).unwrap();
        let (payload, tag) = grant.token.split_once('.').unwrap();

        let other = derive_address(&keypair_from_seed(&[6u8; 32]).public);
        let json = String::from_utf8(hex::decode(payload).unwrap()).unwrap();
        let forged = json.replace(address.as_str(), other.as_str());
        let forged_token = format!("{}.{}", hex::encode(forged), tag);

        assert!(matches!(
            issuer.verify(Some(&forged_token)),
            Err(IdentityError::InvalidCredential)
        ));
        assert!(matches!(
            issuer.verify(Some("garbage")),
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[test]
    fn other_secret_is_invalid() {
        let (clock, issuer, address) = setup();
        let grant = issuer.issue(&address).unwrap();
        let rotated = SessionIssuer::new(b"rotated".to_vec(), clock, WEEK);
        assert!(matches!(
            rotated.verify(Some(&grant.token)),
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[test]
    fn wrong_purpose_is_rejected() {
        let (clock, issuer, address) = setup();
        let judge_issuer =
            SessionIssuer::with_purpose(b"test-secret".to_vec(), clock, WEEK, "agt-judge");
        let grant = judge_issuer.issue(&address).unwrap();
        assert!(matches!(
            issuer.verify(Some(&grant.token)),
            Err(IdentityError::WrongCredentialType)
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("bearer   abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
        assert_eq!(bearer_token(None), None);
    }
}
