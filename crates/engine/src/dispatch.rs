//! The lifecycle dispatcher: binds encrypt-on-write and decrypt-on-read
//! behaviour to every policy-bearing entity type.
//!
//! Per entity-field pair the state machine is:
//!
//! ```text
//! Plaintext(typed) --write-intent: encode, encrypt--> Ciphertext(blob)
//! Ciphertext(blob) --read-intent: decrypt, decode--> Plaintext(typed)
//! ```
//!
//! A field entering a write-intent hook already in `Ciphertext` form is
//! left untouched, so re-saving an already persisted entity never
//! re-encrypts it. Nulls pass through both hooks unchanged. Side effects
//! are confined to mutating the entity's in-memory fields; the dispatcher
//! performs no I/O.

use std::sync::Arc;

use common::{FieldError, FieldValue};
use tracing::{debug, trace};

use crate::codec;
use crate::crypto::{cipher, search};
use crate::hooks::{EntityFields, HookBus};
use crate::key::KeyMaterial;
use crate::policy::PolicyRegistry;

/// Name of the companion column holding a searchable field's lookup
/// digest.
pub fn digest_field_name(field: &str) -> String {
    format!("{field}_hash")
}

/// Routes declared fields through the codec and the cipher on write-intent
/// and read-intent events.
///
/// Holds the process-wide key material and policy registry by `Arc`; both
/// are immutable after startup, so a `FieldEncryptor` clone is safe to
/// invoke from arbitrary threads.
#[derive(Clone)]
pub struct FieldEncryptor {
    key: Arc<KeyMaterial>,
    registry: Arc<PolicyRegistry>,
}

impl FieldEncryptor {
    /// Create a dispatcher over the given key and registry.
    pub fn new(key: Arc<KeyMaterial>, registry: Arc<PolicyRegistry>) -> Self {
        Self { key, registry }
    }

    /// The policy registry this dispatcher consults.
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Register this dispatcher's write-intent and read-intent callbacks
    /// for every policy-bearing entity type.
    ///
    /// This is the explicit startup binding step; nothing is discovered at
    /// runtime.
    pub fn bind(&self, bus: &mut HookBus) {
        for entity_type in self.registry.entity_types() {
            let entity_type = entity_type.to_owned();
            debug!(entity_type = %entity_type, "binding encryption lifecycle hooks");

            let write_side = self.clone();
            let write_type = entity_type.clone();
            bus.on_before_write(entity_type.clone(), move |entity: &mut dyn EntityFields| {
                write_side.encrypt_entity(&write_type, entity)
            });

            let read_side = self.clone();
            let read_type = entity_type.clone();
            bus.on_after_load(entity_type, move |entity: &mut dyn EntityFields| {
                read_side.decrypt_entity(&read_type, entity)
            });
        }
    }

    /// Encrypt every declared field of `entity` in place (write-intent).
    ///
    /// Searchable fields additionally get their `<field>_hash` companion
    /// set to the keyed digest of the same canonical string that was
    /// encrypted, keeping digest and ciphertext consistent.
    ///
    /// # Errors
    ///
    /// Any failure propagates immediately so the surrounding write aborts
    /// before commit — a sibling field failing to encode must never leave a
    /// half-encrypted entity persisted.
    pub fn encrypt_entity(
        &self,
        entity_type: &str,
        entity: &mut dyn EntityFields,
    ) -> Result<(), FieldError> {
        let policy = self.policy_for(entity_type)?;

        for (field, declared) in policy.fields() {
            let value = match entity.get(field) {
                Some(v) => v,
                None => continue,
            };
            // Idempotence guard: an already encrypted field is left as-is
            // across repeated save/reload-then-save cycles. Nulls are never
            // encrypted or hashed.
            if value.is_ciphertext() || value.is_null() {
                trace!(entity_type, field, state = value.kind(), "skipping field");
                continue;
            }

            let canonical = codec::encode(value, declared)?;
            let blob = cipher::encrypt_field(&canonical, &self.key)?;
            entity.set(field, FieldValue::Ciphertext(blob));

            if policy.is_searchable(field) {
                let digest = search::lookup_digest(&canonical, &self.key);
                entity.set(&digest_field_name(field), FieldValue::Text(digest));
            }
            trace!(entity_type, field, "field encrypted");
        }
        Ok(())
    }

    /// Decrypt every declared field of `entity` in place (read-intent).
    ///
    /// Fields not in `Ciphertext` form — already plaintext in memory, or
    /// null/absent — are left unchanged.
    ///
    /// # Errors
    ///
    /// Propagates [`FieldError::Format`], [`FieldError::Integrity`] or
    /// [`FieldError::Coercion`] to the caller of the read operation.
    /// Corrupted ciphertext is never substituted with a default.
    pub fn decrypt_entity(
        &self,
        entity_type: &str,
        entity: &mut dyn EntityFields,
    ) -> Result<(), FieldError> {
        let policy = self.policy_for(entity_type)?;

        for (field, declared) in policy.fields() {
            let blob = match entity.get(field) {
                Some(FieldValue::Ciphertext(blob)) => blob.clone(),
                _ => continue,
            };
            let canonical = cipher::decrypt_field(&blob, &self.key)?;
            entity.set(field, codec::decode(&canonical, declared)?);
            trace!(entity_type, field, "field decrypted");
        }
        Ok(())
    }

    fn policy_for(&self, entity_type: &str) -> Result<&crate::policy::EncryptionPolicy, FieldError> {
        self.registry.get(entity_type).ok_or_else(|| {
            FieldError::Configuration(format!(
                "no encryption policy registered for entity type `{entity_type}`"
            ))
        })
    }
}

impl std::fmt::Debug for FieldEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is redacted by its own Debug impl.
        f.debug_struct("FieldEncryptor")
            .field("policies", &self.registry.len())
            .finish()
    }
}
