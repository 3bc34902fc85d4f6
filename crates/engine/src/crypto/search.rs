//! Deterministic keyed hashing for exact-match lookup on encrypted fields.
//!
//! The field cipher is deliberately non-deterministic, so ciphertext cannot
//! be used for indexed lookup. Searchable fields therefore store a companion
//! HMAC-SHA256 digest of the canonical plaintext: equal `(plaintext, key)`
//! pairs always produce equal digests, so an index over the companion column
//! supports equality queries without exposing plaintext. Exact match only —
//! no range or fuzzy queries — and no collision resistance against
//! dictionary attacks beyond what the keyed construction provides.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::key::KeyMaterial;

type HmacSha256 = Hmac<Sha256>;

/// Character length of a rendered digest (SHA-256 in lowercase hex).
pub const DIGEST_LEN: usize = 64;

/// Compute the deterministic lookup digest of a canonical plaintext string.
///
/// The input must be the same canonical string that is encrypted for the
/// field — hashing the raw typed value instead would make equality lookups
/// diverge across writes originating from differently-typed inputs.
pub fn lookup_digest(plaintext: &str, key: &KeyMaterial) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(plaintext.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KEY_LEN;

    fn key(fill: u8) -> KeyMaterial {
        KeyMaterial::from_bytes([fill; KEY_LEN])
    }

    #[test]
    fn digest_is_deterministic() {
        let k = key(1);
        assert_eq!(lookup_digest("Alice", &k), lookup_digest("Alice", &k));
    }

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let d = lookup_digest("Alice", &key(1));
        assert_eq!(d.len(), DIGEST_LEN);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_plaintexts_differ() {
        let k = key(1);
        assert_ne!(lookup_digest("Alice", &k), lookup_digest("Bob", &k));
        assert_ne!(lookup_digest("42", &k), lookup_digest("43", &k));
    }

    #[test]
    fn different_keys_differ() {
        assert_ne!(lookup_digest("Alice", &key(1)), lookup_digest("Alice", &key(2)));
    }
}
