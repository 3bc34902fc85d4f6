//! The lifecycle hook contract between the encryption core and whatever
//! persistence layer surrounds it.
//!
//! The core never talks to storage directly. It asks only that the
//! persistence layer expose field accessors on its entities
//! ([`EntityFields`]) and fire two synchronous events through a
//! [`HookBus`]: a write-intent event before an insert or update commits,
//! and a read-intent event after an entity is materialised from storage.
//! A hook returning an error must abort the surrounding operation.

use std::collections::HashMap;

use common::{FieldError, FieldValue};

/// Field accessors every hook-aware entity representation must provide.
pub trait EntityFields {
    /// Current value of a field, or `None` if the entity has no such field.
    fn get(&self, field: &str) -> Option<&FieldValue>;

    /// Set (or create) a field's value.
    fn set(&mut self, field: &str, value: FieldValue);
}

/// A registered lifecycle callback. Invoked synchronously on the thread
/// executing the surrounding persistence operation.
pub type HookFn = Box<dyn Fn(&mut dyn EntityFields) -> Result<(), FieldError> + Send + Sync>;

/// Registry of write-intent and read-intent callbacks, keyed by entity
/// type.
///
/// Registration happens during deterministic process initialisation (the
/// dispatcher binds one callback pair per policy-bearing entity type);
/// after that the bus is only read. Emitting for an entity type with no
/// registered callbacks is a no-op — unencrypted entity types flow through
/// untouched.
#[derive(Default)]
pub struct HookBus {
    before_write: HashMap<String, Vec<HookFn>>,
    after_load: HashMap<String, Vec<HookFn>>,
}

impl HookBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to run before an insert or update of the given
    /// entity type commits.
    pub fn on_before_write<F>(&mut self, entity_type: impl Into<String>, hook: F)
    where
        F: Fn(&mut dyn EntityFields) -> Result<(), FieldError> + Send + Sync + 'static,
    {
        self.before_write
            .entry(entity_type.into())
            .or_default()
            .push(Box::new(hook));
    }

    /// Register a callback to run after an entity of the given type is
    /// reconstructed from storage.
    pub fn on_after_load<F>(&mut self, entity_type: impl Into<String>, hook: F)
    where
        F: Fn(&mut dyn EntityFields) -> Result<(), FieldError> + Send + Sync + 'static,
    {
        self.after_load
            .entry(entity_type.into())
            .or_default()
            .push(Box::new(hook));
    }

    /// Fire the write-intent event.
    ///
    /// # Errors
    ///
    /// Propagates the first callback failure; the caller must abort the
    /// write before commit.
    pub fn emit_before_write(
        &self,
        entity_type: &str,
        entity: &mut dyn EntityFields,
    ) -> Result<(), FieldError> {
        run_hooks(&self.before_write, entity_type, entity)
    }

    /// Fire the read-intent event.
    ///
    /// # Errors
    ///
    /// Propagates the first callback failure to the caller of the read
    /// operation.
    pub fn emit_after_load(
        &self,
        entity_type: &str,
        entity: &mut dyn EntityFields,
    ) -> Result<(), FieldError> {
        run_hooks(&self.after_load, entity_type, entity)
    }
}

fn run_hooks(
    hooks: &HashMap<String, Vec<HookFn>>,
    entity_type: &str,
    entity: &mut dyn EntityFields,
) -> Result<(), FieldError> {
    if let Some(callbacks) = hooks.get(entity_type) {
        for hook in callbacks {
            hook(entity)?;
        }
    }
    Ok(())
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookBus")
            .field("before_write", &self.before_write.keys())
            .field("after_load", &self.after_load.keys())
            .finish()
    }
}
