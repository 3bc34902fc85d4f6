//! An in-memory entity store implementing the persistence side of the
//! lifecycle hook contract.
//!
//! The encryption core only asks a persistence layer to fire a write-intent
//! event before committing an insert or update, fire a read-intent event
//! after materialising an entity, and expose field get/set accessors. This
//! crate provides the minimal store that honours that contract: rows are
//! kept encrypted at rest (in the map), hooks run on the way in and out,
//! and searchable fields can be queried by their companion lookup digest.

use std::collections::{BTreeMap, HashMap};

use common::{FieldError, FieldValue};
use engine::dispatch::digest_field_name;
use engine::hooks::{EntityFields, HookBus};
use thiserror::Error;
use tracing::debug;

/// Errors produced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with the given id exists for the entity type.
    #[error("no `{entity_type}` row with id {id}")]
    NotFound {
        /// Entity type that was queried.
        entity_type: String,
        /// Row id that was queried.
        id: u64,
    },

    /// A lifecycle hook failed; the surrounding operation was aborted.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A single entity row: a flat map of field name to tagged value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chained constructor for seeding fields.
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    /// Read a field without going through the trait object.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

impl EntityFields for Record {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_owned(), value);
    }
}

/// In-memory tables keyed by entity type, firing lifecycle hooks around
/// every insert, update, and fetch.
///
/// Rows are stored exactly as the write-intent hook leaves them — declared
/// fields as ciphertext blobs, searchable companions as digests — so the
/// map contents mirror what a database would persist.
pub struct MemStore {
    bus: HookBus,
    tables: HashMap<String, BTreeMap<u64, Record>>,
    next_id: u64,
}

impl MemStore {
    /// Create a store around a fully bound [`HookBus`].
    pub fn new(bus: HookBus) -> Self {
        Self {
            bus,
            tables: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new row, firing the write-intent hook first.
    ///
    /// # Errors
    ///
    /// If the hook fails the row is not stored — the whole write aborts,
    /// never persisting a half-encrypted entity.
    pub fn insert(&mut self, entity_type: &str, mut record: Record) -> Result<u64, StoreError> {
        self.bus.emit_before_write(entity_type, &mut record)?;
        let id = self.next_id;
        self.next_id += 1;
        self.tables
            .entry(entity_type.to_owned())
            .or_default()
            .insert(id, record);
        debug!(entity_type, id, "row inserted");
        Ok(id)
    }

    /// Replace an existing row, firing the write-intent hook first.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the row does not exist; hook failures
    /// abort the update with the stored row unchanged.
    pub fn update(&mut self, entity_type: &str, id: u64, mut record: Record) -> Result<(), StoreError> {
        if self.stored(entity_type, id).is_none() {
            return Err(StoreError::NotFound {
                entity_type: entity_type.to_owned(),
                id,
            });
        }
        self.bus.emit_before_write(entity_type, &mut record)?;
        self.tables
            .entry(entity_type.to_owned())
            .or_default()
            .insert(id, record);
        debug!(entity_type, id, "row updated");
        Ok(())
    }

    /// Materialise a row, firing the read-intent hook on a copy so the
    /// stored form stays encrypted.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the row does not exist; hook failures
    /// (corrupt ciphertext, wrong key) propagate — the store never
    /// substitutes a default for a field it cannot decrypt.
    pub fn fetch(&self, entity_type: &str, id: u64) -> Result<Record, StoreError> {
        let mut record = self
            .stored(entity_type, id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_owned(),
                id,
            })?;
        self.bus.emit_after_load(entity_type, &mut record)?;
        Ok(record)
    }

    /// Exact-match lookup over a searchable field's companion digest
    /// column, returning materialised (decrypted) rows.
    ///
    /// The caller computes `digest` from the candidate plaintext with the
    /// same key the write side used; matching is a plain string equality
    /// scan over `<field>_hash`.
    ///
    /// # Errors
    ///
    /// Propagates read-intent hook failures from any matching row.
    pub fn find_by_digest(
        &self,
        entity_type: &str,
        field: &str,
        digest: &str,
    ) -> Result<Vec<(u64, Record)>, StoreError> {
        let companion = digest_field_name(field);
        let mut matches = Vec::new();
        if let Some(table) = self.tables.get(entity_type) {
            for (&id, stored) in table {
                let hit = matches!(
                    stored.field(&companion),
                    Some(FieldValue::Text(d)) if d.as_str() == digest
                );
                if hit {
                    let mut record = stored.clone();
                    self.bus.emit_after_load(entity_type, &mut record)?;
                    matches.push((id, record));
                }
            }
        }
        Ok(matches)
    }

    /// The persisted form of a row, bypassing the read-intent hook.
    /// Declared fields appear here as ciphertext blobs.
    pub fn stored(&self, entity_type: &str, id: u64) -> Option<&Record> {
        self.tables.get(entity_type)?.get(&id)
    }

    /// Mutable access to the persisted form of a row, bypassing all hooks.
    /// Exists for inspection and corruption-injection in tests; not part of
    /// the lifecycle contract.
    pub fn stored_mut(&mut self, entity_type: &str, id: u64) -> Option<&mut Record> {
        self.tables.get_mut(entity_type)?.get_mut(&id)
    }

    /// Number of rows stored for an entity type.
    pub fn len(&self, entity_type: &str) -> usize {
        self.tables.get(entity_type).map_or(0, BTreeMap::len)
    }

    /// Returns `true` if no rows are stored for the entity type.
    pub fn is_empty(&self, entity_type: &str) -> bool {
        self.len(entity_type) == 0
    }
}
