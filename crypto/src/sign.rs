//! Ed25519 message signing and verification.

use agt_types::{PrivateKey, PublicKey, Signature, WalletAddress};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::address::public_key_of;

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Verify that `signature` over `message` was produced by the key owning `address`.
pub fn verify_address_signature(
    message: &[u8],
    signature: &Signature,
    address: &WalletAddress,
) -> bool {
    match public_key_of(address) {
        Some(public_key) => verify_signature(message, signature, &public_key),
        None => false,
    }
}
