//! Cryptographic primitives for field encryption.
//!
//! This module is free of policy and persistence concerns; it operates on
//! one canonical string at a time.
//!
//! # Ciphertext blob format
//!
//! ```text
//! 12-byte nonce ‖ 16-byte GCM tag ‖ ciphertext
//! ```
//!
//! This is the only form a declared field may take once persisted. No key
//! version tag is embedded: rotating the secret key invalidates previously
//! stored ciphertext.

pub mod cipher;
pub mod search;

pub use cipher::{MIN_BLOB_LEN, NONCE_LEN, TAG_LEN};
