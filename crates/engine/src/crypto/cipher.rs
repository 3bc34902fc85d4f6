//! AES-256-GCM encryption and decryption of individual field strings.
//!
//! Every call to [`encrypt_field`] draws a fresh random 96-bit nonce from
//! the OS CSPRNG, so encrypting the same plaintext twice under the same key
//! produces different blobs. The GCM tag makes any bit flip in the stored
//! blob detectable at decryption time.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use common::FieldError;

use crate::key::KeyMaterial;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Minimum length of a structurally valid blob: nonce + tag with an empty
/// ciphertext.
pub const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

/// Encrypt a canonical plaintext string into a `nonce ‖ tag ‖ ciphertext`
/// blob.
///
/// The ciphertext section has exactly the UTF-8 length of `plaintext`, so a
/// valid blob is always `28 + n` bytes long.
///
/// # Errors
///
/// Returns [`FieldError::Format`] if the plaintext exceeds the AES-GCM
/// single-message limit (not reachable for realistic field values).
pub fn encrypt_field(plaintext: &str, key: &KeyMaterial) -> Result<Vec<u8>, FieldError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    // Use OsRng for a cryptographically secure random nonce.
    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // The aead crate appends the tag to the ciphertext; the persisted
    // layout wants it up front, directly after the nonce.
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| FieldError::Format("plaintext too large to encrypt".into()))?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    let mut blob = Vec::with_capacity(MIN_BLOB_LEN + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Decrypt a `nonce ‖ tag ‖ ciphertext` blob back to its canonical
/// plaintext string.
///
/// No partial or best-effort plaintext is ever returned on failure.
///
/// # Errors
///
/// Returns [`FieldError::Format`] if the blob is shorter than
/// [`MIN_BLOB_LEN`] bytes or the decrypted bytes are not valid UTF-8.
/// Returns [`FieldError::Integrity`] if tag verification fails (tampered
/// data or wrong key).
pub fn decrypt_field(blob: &[u8], key: &KeyMaterial) -> Result<String, FieldError> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(FieldError::Format(format!(
            "blob is {} bytes; minimum is {MIN_BLOB_LEN}",
            blob.len()
        )));
    }
    let (nonce_bytes, rest) = blob.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    // Reassemble into the ciphertext-then-tag layout the aead crate expects.
    let mut sealed = Vec::with_capacity(rest.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed.as_ref())
        .map_err(|_| FieldError::Integrity)?;

    String::from_utf8(plaintext)
        .map_err(|_| FieldError::Format("decrypted plaintext is not valid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> KeyMaterial {
        use aes_gcm::aead::rand_core::RngCore;
        let mut bytes = [0u8; crate::key::KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        KeyMaterial::from_bytes(bytes)
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = random_key();
        let blob = encrypt_field("123-45-6789", &key).unwrap();
        assert_eq!(decrypt_field(&blob, &key).unwrap(), "123-45-6789");
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = random_key();
        let blob = encrypt_field("", &key).unwrap();
        assert_eq!(blob.len(), MIN_BLOB_LEN);
        assert_eq!(decrypt_field(&blob, &key).unwrap(), "");
    }

    #[test]
    fn blob_length_is_header_plus_utf8_length() {
        let key = random_key();
        let blob = encrypt_field("Alice", &key).unwrap();
        assert_eq!(blob.len(), MIN_BLOB_LEN + "Alice".len());

        let blob = encrypt_field("héllo", &key).unwrap();
        assert_eq!(blob.len(), MIN_BLOB_LEN + "héllo".len());
    }

    #[test]
    fn encryption_is_non_deterministic() {
        let key = random_key();
        let a = encrypt_field("same input", &key).unwrap();
        let b = encrypt_field("same input", &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_with_integrity_error() {
        let blob = encrypt_field("secret", &random_key()).unwrap();
        let err = decrypt_field(&blob, &random_key()).unwrap_err();
        assert!(matches!(err, FieldError::Integrity));
    }

    #[test]
    fn any_single_byte_flip_is_detected() {
        let key = random_key();
        let blob = encrypt_field("tamper me", &key).unwrap();
        // Flip one byte at every offset: nonce, tag, and ciphertext regions.
        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            let err = decrypt_field(&tampered, &key).unwrap_err();
            assert!(
                matches!(err, FieldError::Integrity),
                "byte {i} flip not detected"
            );
        }
    }

    #[test]
    fn short_blob_fails_with_format_error() {
        let key = random_key();
        for len in 0..MIN_BLOB_LEN {
            let err = decrypt_field(&vec![0u8; len], &key).unwrap_err();
            assert!(matches!(err, FieldError::Format(_)), "length {len}");
        }
    }
}
