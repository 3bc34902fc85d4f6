//! `engine` — the field encryption core.
//!
//! Transparently encrypts declared entity fields before they reach storage
//! and decrypts them when entities are materialised, with optional
//! exact-match lookup over encrypted fields via a deterministic keyed hash.
//!
//! The pieces, leaves first:
//! - [`crypto::cipher`] — AES-256-GCM encryption of a single canonical
//!   string into a `nonce ‖ tag ‖ ciphertext` blob.
//! - [`crypto::search`] — HMAC-SHA256 lookup digest for searchable fields.
//! - [`codec`] — lossless conversion between typed values and their
//!   canonical string form.
//! - [`policy`] — the immutable per-entity-type registry of encrypted and
//!   searchable fields, built once at startup.
//! - [`hooks`] / [`dispatch`] — the write-intent / read-intent lifecycle
//!   contract and the dispatcher that binds encrypt-on-write and
//!   decrypt-on-read behaviour to it.
//!
//! The core performs no I/O and owns no transaction boundary: it mutates
//! entity field values in memory, synchronously, inside whatever operation
//! the surrounding persistence layer is executing.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod hooks;
pub mod key;
pub mod policy;

pub use common::{DeclaredType, FieldError, FieldValue};
pub use dispatch::FieldEncryptor;
pub use key::{KeyMaterial, KEY_LEN};
pub use policy::{EncryptionPolicy, PolicyRegistry};
