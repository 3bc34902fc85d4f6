//! The tagged field value model.
//!
//! Every entity field the encryption layer touches is represented as a
//! [`FieldValue`], which carries an explicit tag for its encryption state:
//! a value is either one of the typed plaintext variants or
//! [`FieldValue::Ciphertext`]. The write-intent idempotence guard checks
//! this tag, never "does it look like raw bytes" — a plaintext value that
//! happens to contain binary-ish text can never be mistaken for an already
//! encrypted field.

use chrono::{DateTime, Utc};

/// The closed set of semantic types a declared (encrypted) field may have.
///
/// Each declared field in an encryption policy names one of these; the codec
/// dispatches on the tag rather than inspecting the runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// Free-form UTF-8 text; passes through the codec unchanged.
    Text,
    /// Signed 64-bit integer; canonical decimal text.
    Integer,
    /// 64-bit float; canonical (shortest round-trip) decimal text.
    Real,
    /// UTC timestamp; canonical RFC 3339 text.
    Timestamp,
    /// An enumeration, carried as its underlying scalar value.
    Enumeration,
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeclaredType::Text => "text",
            DeclaredType::Integer => "integer",
            DeclaredType::Real => "real",
            DeclaredType::Timestamp => "timestamp",
            DeclaredType::Enumeration => "enumeration",
        };
        f.write_str(name)
    }
}

/// A single entity field value, tagged with its state.
///
/// The plaintext variants mirror [`DeclaredType`]; `Ciphertext` holds the
/// persisted form (`nonce ‖ tag ‖ ciphertext`) and `Null` an absent value.
/// Nulls are never encrypted or hashed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value; passes through both lifecycle hooks untouched.
    Null,
    /// Plaintext UTF-8 text.
    Text(String),
    /// Plaintext signed integer.
    Integer(i64),
    /// Plaintext 64-bit float.
    Real(f64),
    /// Plaintext UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// Plaintext enumeration, as its underlying scalar value.
    Enum(String),
    /// An encrypted blob: 12-byte nonce ‖ 16-byte tag ‖ ciphertext.
    Ciphertext(Vec<u8>),
}

impl FieldValue {
    /// Returns `true` if this value is already in its persisted, encrypted
    /// form.
    pub fn is_ciphertext(&self) -> bool {
        matches!(self, FieldValue::Ciphertext(_))
    }

    /// Returns `true` if this value is absent.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Short human-readable name of this value's tag, for error messages
    /// and logs. Never includes the value itself.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real(_) => "real",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Enum(_) => "enumeration",
            FieldValue::Ciphertext(_) => "ciphertext",
        }
    }
}
