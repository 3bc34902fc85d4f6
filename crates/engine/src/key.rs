//! Secret key material for the cipher and the search hasher.
//!
//! The key is constructed exactly once at process start (from deployment
//! configuration, see [`crate::config`]) and shared read-only by reference
//! afterwards — there is no hidden module-level singleton and no mutation
//! after construction, so concurrent access needs no locking.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::FieldError;

/// Byte length of the symmetric key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed-size secret key buffer holding exactly [`KEY_LEN`] bytes.
///
/// Shared by the cipher and the search hasher, typically behind an `Arc`.
/// When dropped, the memory is overwritten with zeroes to minimise the
/// window during which plaintext key material lives in RAM.
pub struct KeyMaterial(Box<[u8; KEY_LEN]>);

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Decode a base64-encoded 32-byte key, as supplied via deployment
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Configuration`] if the input is not valid
    /// base64 or does not decode to exactly [`KEY_LEN`] bytes. Both are
    /// fatal startup conditions.
    pub fn from_base64(encoded: &str) -> Result<Self, FieldError> {
        let decoded = STANDARD.decode(encoded.trim()).map_err(|e| {
            FieldError::Configuration(format!("secret key is not valid base64: {e}"))
        })?;
        if decoded.len() != KEY_LEN {
            return Err(FieldError::Configuration(format!(
                "secret key must decode to {KEY_LEN} bytes, got {}",
                decoded.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&decoded);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let raw = [0x42u8; KEY_LEN];
        let encoded = STANDARD.encode(raw);
        let key = KeyMaterial::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &raw);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let encoded = format!("  {}\n", STANDARD.encode([7u8; KEY_LEN]));
        assert!(KeyMaterial::from_base64(&encoded).is_ok());
    }

    #[test]
    fn malformed_base64_rejected() {
        let err = KeyMaterial::from_base64("!!not base64!!").unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
    }

    #[test]
    fn wrong_length_rejected() {
        let short = STANDARD.encode([0u8; 16]);
        let err = KeyMaterial::from_base64(&short).unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn key_material_redacted_in_debug() {
        let key = KeyMaterial::from_bytes([0xFFu8; KEY_LEN]);
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("255"));
    }
}
