//! Encryption policies: which fields of which entity types are encrypted,
//! their declared types, and which of them are additionally searchable.
//!
//! Policies are registered explicitly during process initialisation — never
//! discovered by reflecting over loaded types — and the resulting
//! [`PolicyRegistry`] is immutable. It is read concurrently by the
//! dispatcher without locking; safety follows from never mutating it after
//! [`PolicyRegistryBuilder::build`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use common::{DeclaredType, FieldError};

/// The encryption policy of a single entity type.
///
/// Maps each encrypted field name to its declared type and records the
/// subset of fields that also get a lookup digest. Built with the chained
/// constructor:
///
/// ```
/// use common::DeclaredType;
/// use engine::policy::EncryptionPolicy;
///
/// let policy = EncryptionPolicy::for_entity("book")
///     .field("title", DeclaredType::Text)
///     .field("price", DeclaredType::Integer)
///     .searchable("title");
/// ```
#[derive(Debug, Clone)]
pub struct EncryptionPolicy {
    entity_type: String,
    fields: BTreeMap<String, DeclaredType>,
    searchable: BTreeSet<String>,
}

impl EncryptionPolicy {
    /// Start a policy for the named entity type.
    pub fn for_entity(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: BTreeMap::new(),
            searchable: BTreeSet::new(),
        }
    }

    /// Declare `name` as an encrypted field of the given type.
    pub fn field(mut self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.fields.insert(name.into(), declared);
        self
    }

    /// Mark a declared field as searchable. Validated at registry build
    /// time: the name must refer to a declared field.
    pub fn searchable(mut self, name: impl Into<String>) -> Self {
        self.searchable.insert(name.into());
        self
    }

    /// The entity type this policy applies to.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Iterate the declared fields in a stable (lexicographic) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, DeclaredType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// The declared type of a field, if it is part of this policy.
    pub fn declared_type(&self, field: &str) -> Option<DeclaredType> {
        self.fields.get(field).copied()
    }

    /// Whether the field gets a companion lookup digest.
    pub fn is_searchable(&self, field: &str) -> bool {
        self.searchable.contains(field)
    }

    fn validate(&self) -> Result<(), FieldError> {
        if self.fields.is_empty() {
            return Err(FieldError::Configuration(format!(
                "policy for `{}` declares no encrypted fields",
                self.entity_type
            )));
        }
        for name in &self.searchable {
            if !self.fields.contains_key(name) {
                return Err(FieldError::Configuration(format!(
                    "policy for `{}` marks undeclared field `{name}` as searchable",
                    self.entity_type
                )));
            }
        }
        Ok(())
    }
}

/// Immutable, process-wide table of encryption policies keyed by entity
/// type. Built once at startup; shared read-only thereafter (typically
/// behind an `Arc`).
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: HashMap<String, EncryptionPolicy>,
}

impl PolicyRegistry {
    /// Start building a registry.
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder {
            policies: Vec::new(),
        }
    }

    /// Look up the policy for an entity type.
    pub fn get(&self, entity_type: &str) -> Option<&EncryptionPolicy> {
        self.policies.get(entity_type)
    }

    /// Iterate all policy-bearing entity types.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if no policies are registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Accumulates policies before validation.
pub struct PolicyRegistryBuilder {
    policies: Vec<EncryptionPolicy>,
}

impl PolicyRegistryBuilder {
    /// Add an entity type's policy.
    pub fn register(mut self, policy: EncryptionPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Validate every policy and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Configuration`] if a policy declares no fields,
    /// marks an undeclared field searchable, or an entity type is registered
    /// twice. All of these are fatal at startup.
    pub fn build(self) -> Result<PolicyRegistry, FieldError> {
        let mut policies = HashMap::with_capacity(self.policies.len());
        for policy in self.policies {
            policy.validate()?;
            let entity_type = policy.entity_type.clone();
            if policies.insert(entity_type.clone(), policy).is_some() {
                return Err(FieldError::Configuration(format!(
                    "entity type `{entity_type}` registered more than once"
                )));
            }
        }
        Ok(PolicyRegistry { policies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_resolves_policies() {
        let registry = PolicyRegistry::builder()
            .register(
                EncryptionPolicy::for_entity("book")
                    .field("title", DeclaredType::Text)
                    .field("price", DeclaredType::Integer)
                    .searchable("title"),
            )
            .register(EncryptionPolicy::for_entity("author").field("name", DeclaredType::Text))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        let book = registry.get("book").unwrap();
        assert_eq!(book.declared_type("title"), Some(DeclaredType::Text));
        assert_eq!(book.declared_type("price"), Some(DeclaredType::Integer));
        assert!(book.is_searchable("title"));
        assert!(!book.is_searchable("price"));
        assert!(registry.get("publisher").is_none());
    }

    #[test]
    fn fields_iterate_in_stable_order() {
        let policy = EncryptionPolicy::for_entity("e")
            .field("b", DeclaredType::Text)
            .field("a", DeclaredType::Text);
        let names: Vec<&str> = policy.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn searchable_must_be_declared() {
        let err = PolicyRegistry::builder()
            .register(
                EncryptionPolicy::for_entity("book")
                    .field("title", DeclaredType::Text)
                    .searchable("isbn"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
        assert!(err.to_string().contains("isbn"));
    }

    #[test]
    fn empty_policy_rejected() {
        let err = PolicyRegistry::builder()
            .register(EncryptionPolicy::for_entity("book"))
            .build()
            .unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
    }

    #[test]
    fn duplicate_entity_type_rejected() {
        let err = PolicyRegistry::builder()
            .register(EncryptionPolicy::for_entity("book").field("title", DeclaredType::Text))
            .register(EncryptionPolicy::for_entity("book").field("price", DeclaredType::Integer))
            .build()
            .unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
        assert!(err.to_string().contains("book"));
    }
}
