//! Cryptographic primitives for the arena.
//!
//! - **Ed25519** for wallet signing and signature verification
//! - **Blake2b** for address checksums
//! - **HMAC-SHA256** for authenticating session credentials
//! - Address derivation with `agt_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod mac;
pub mod nonce;
pub mod sign;

pub use address::{decode_address, derive_address, parse_address, public_key_of, validate_address};
pub use hash::blake2b_256;
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed};
pub use mac::{hmac_sha256, verify_hmac_sha256};
pub use nonce::{random_bytes, random_nonce_hex};
pub use sign::{sign_message, verify_address_signature, verify_signature};
