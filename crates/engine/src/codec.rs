//! Lossless conversion between typed field values and their canonical
//! string form.
//!
//! The cipher only handles strings, so every typed value is normalised to a
//! unique textual representation before encryption and restored from it
//! after decryption. Round-trip law: `decode(encode(v, T), T) == v` for
//! every supported value `v` of declared type `T`.
//!
//! Canonical forms:
//! - text: unchanged
//! - integer / real: Rust `Display` decimal (shortest round-trip for `f64`)
//! - timestamp: RFC 3339 with `Z` offset, sub-second digits only when present
//! - enumeration: the underlying scalar value, unchanged

use chrono::{DateTime, SecondsFormat, Utc};
use common::{DeclaredType, FieldError, FieldValue};

/// Canonicalise a typed plaintext value to its string form.
///
/// # Errors
///
/// Returns [`FieldError::Coercion`] if the value's tag does not match the
/// declared type, or if the value is `Null` or already `Ciphertext` (the
/// dispatcher filters those out before encoding).
pub fn encode(value: &FieldValue, declared: DeclaredType) -> Result<String, FieldError> {
    match (value, declared) {
        (FieldValue::Text(s), DeclaredType::Text) => Ok(s.clone()),
        (FieldValue::Integer(i), DeclaredType::Integer) => Ok(i.to_string()),
        (FieldValue::Real(r), DeclaredType::Real) => Ok(r.to_string()),
        (FieldValue::Timestamp(t), DeclaredType::Timestamp) => {
            Ok(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        (FieldValue::Enum(v), DeclaredType::Enumeration) => Ok(v.clone()),
        (other, declared) => Err(FieldError::Coercion {
            input: other.kind().to_owned(),
            declared,
        }),
    }
}

/// Parse a canonical string back into a typed plaintext value.
///
/// # Errors
///
/// Returns [`FieldError::Coercion`] if the string does not parse as the
/// declared type.
pub fn decode(s: &str, declared: DeclaredType) -> Result<FieldValue, FieldError> {
    let coercion = || FieldError::Coercion {
        input: s.to_owned(),
        declared,
    };
    match declared {
        DeclaredType::Text => Ok(FieldValue::Text(s.to_owned())),
        DeclaredType::Integer => s
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| coercion()),
        DeclaredType::Real => s
            .parse::<f64>()
            .map(FieldValue::Real)
            .map_err(|_| coercion()),
        DeclaredType::Timestamp => DateTime::parse_from_rfc3339(s)
            .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
            .map_err(|_| coercion()),
        DeclaredType::Enumeration => Ok(FieldValue::Enum(s.to_owned())),
    }
}
