//! Error taxonomy for the field encryption layer.

use thiserror::Error;

use crate::value::DeclaredType;

/// Errors raised by the field encryption layer.
///
/// All of these are deterministic functions of their inputs — a failure
/// signals a data or configuration defect, never a transient condition, so
/// nothing is ever retried automatically. Propagation contract:
/// - [`FieldError::Configuration`] is fatal at startup; the process must
///   refuse to serve traffic.
/// - The remaining variants, raised inside a read-intent hook, propagate to
///   the caller of the read; raised inside a write-intent hook they abort
///   the surrounding write before it commits.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A stored blob is structurally invalid: shorter than the 28-byte
    /// nonce + tag header, or the decrypted bytes are not valid UTF-8.
    #[error("invalid ciphertext blob: {0}")]
    Format(String),

    /// Authentication tag verification failed — the blob was tampered with
    /// or was encrypted under a different key.
    #[error("ciphertext failed integrity verification (tampered data or wrong key)")]
    Integrity,

    /// A canonical plaintext string does not parse as the field's declared
    /// type, or a typed value was offered under a mismatched declaration.
    #[error("value of kind `{input}` cannot be coerced to declared type `{declared}`")]
    Coercion {
        /// What was found: the offending string, or a value-tag name.
        input: String,
        /// The declared type it failed to coerce to.
        declared: DeclaredType,
    },

    /// Invalid policy registration, or an absent/malformed secret key at
    /// startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = FieldError::Format("blob is 5 bytes; minimum is 28".into());
        assert!(e.to_string().contains("minimum is 28"));

        let e = FieldError::Coercion {
            input: "not-a-number".into(),
            declared: DeclaredType::Integer,
        };
        assert!(e.to_string().contains("not-a-number"));
        assert!(e.to_string().contains("integer"));
    }

    #[test]
    fn integrity_message_names_both_causes() {
        let msg = FieldError::Integrity.to_string();
        assert!(msg.contains("tampered"));
        assert!(msg.contains("wrong key"));
    }
}
