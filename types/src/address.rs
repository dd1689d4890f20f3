//! Wallet address type with `agt_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AgtError;

/// An arena wallet address, always prefixed with `agt_` and always lowercase.
///
/// Derived from the wallet's Ed25519 public key via base32 encoding plus a
/// Blake2b checksum (see `agt_crypto::derive_address`). This type only checks
/// the syntactic shape; checksum validation lives in `agt-crypto`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for all arena wallet addresses.
    pub const PREFIX: &'static str = "agt_";

    /// Number of base32 characters after the prefix (52 key + 8 checksum).
    pub const ENCODED_LEN: usize = 60;

    /// Base32 alphabet used by the encoded part.
    pub const ALPHABET: &'static str = "13456789abcdefghijkmnopqrstuwxyz";

    /// Wrap an already-canonical address string.
    ///
    /// Callers must pass a lowercase `agt_` string; use [`WalletAddress::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        debug_assert!(s.starts_with(Self::PREFIX), "address must start with agt_");
        Self(s)
    }

    /// Parse untrusted input into the canonical form.
    ///
    /// Surrounding whitespace is trimmed and the string is lowercased before
    /// the shape check, so `AGT_...` and ` agt_... ` name the same wallet.
    pub fn parse(raw: &str) -> Result<Self, AgtError> {
        let canonical = raw.trim().to_ascii_lowercase();
        let candidate = Self(canonical);
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(AgtError::InvalidAddress(raw.trim().to_string()))
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base32 part after the prefix.
    pub fn encoded(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or("")
    }

    /// Validate that this address is well-formed (prefix, length, alphabet).
    pub fn is_valid(&self) -> bool {
        let Some(encoded) = self.0.strip_prefix(Self::PREFIX) else {
            return false;
        };
        encoded.len() == Self::ENCODED_LEN
            && encoded.chars().all(|c| Self::ALPHABET.contains(c))
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = AgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        format!("agt_{}", "1".repeat(WalletAddress::ENCODED_LEN))
    }

    #[test]
    fn parse_canonicalizes_case_and_whitespace() {
        let raw = format!("  {}  ", sample().to_uppercase());
        let addr = WalletAddress::parse(&raw).unwrap();
        assert_eq!(addr.as_str(), sample());
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let raw = format!("xyz_{}", "1".repeat(WalletAddress::ENCODED_LEN));
        assert!(matches!(
            WalletAddress::parse(&raw),
            Err(AgtError::InvalidAddress(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(WalletAddress::parse("agt_1111").is_err());
        assert!(WalletAddress::parse("agt_").is_err());
        assert!(WalletAddress::parse("").is_err());
    }

    #[test]
    fn parse_rejects_characters_outside_alphabet() {
        // '0', '2', 'l' and 'v' are excluded from the alphabet.
        for bad in ['0', '2', 'l', 'v'] {
            let mut raw = sample();
            raw.pop();
            raw.push(bad);
            assert!(WalletAddress::parse(&raw).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn encoded_strips_prefix() {
        let addr = WalletAddress::parse(&sample()).unwrap();
        assert_eq!(addr.encoded().len(), WalletAddress::ENCODED_LEN);
    }
}
