//! Random nonces and secrets from the operating system RNG.

use rand::rngs::OsRng;
use rand::RngCore;

/// `N` random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    OsRng.fill_bytes(&mut out);
    out
}

/// A 128-bit random nonce rendered as 32 lowercase hex characters.
pub fn random_nonce_hex() -> String {
    hex::encode(random_bytes::<16>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_shape() {
        let n = random_nonce_hex();
        assert_eq!(n.len(), 32);
        assert!(n.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn nonces_are_unique() {
        assert_ne!(random_nonce_hex(), random_nonce_hex());
    }
}
