//! Ed25519 wallet keys.

use agt_types::{KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// A fresh wallet from the OS random source.
pub fn generate_keypair() -> KeyPair {
    keypair_from_private(PrivateKey(SigningKey::generate(&mut OsRng).to_bytes()))
}

/// Rebuild the wallet for a stored private key, e.g. one handed to `agt-daemon sign`.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes());
    KeyPair { public, private }
}

/// Deterministic wallet from a 32-byte seed. Tests use small fixed seeds.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_private(PrivateKey(*seed))
}
