// crates/formwell-core/src/runtime/registry.rs
// ============================================================================
// Module: Formwell Field Type Registry
// Description: Catalog service for reusable field identities.
// Purpose: Provide key/canonical/alias lookup and custom entry management.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The registry wraps a [`FieldTypeStore`] with the catalog semantics:
//! system entries are seeded once and immutable, custom entries may come
//! and go, and machine key plus canonical attribute name are each globally
//! unique. The registry is small and stable, so alias lookup is a linear
//! scan over the full catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::FieldCategory;
use crate::core::FieldType;
use crate::core::FieldTypeKey;
use crate::core::system_catalog;
use crate::interfaces::FieldTypeStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry operation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No field type is registered under the key.
    #[error("unknown field type: {0}")]
    NotFound(FieldTypeKey),
    /// A field type with the same machine key already exists.
    #[error("duplicate field type key: {0}")]
    DuplicateKey(FieldTypeKey),
    /// A field type with the same canonical name already exists.
    #[error("canonical name {canonical_name} already registered under key {existing_key}")]
    DuplicateCanonicalName {
        /// Conflicting canonical attribute name.
        canonical_name: String,
        /// Key of the entry already holding the name.
        existing_key: FieldTypeKey,
    },
    /// System entries cannot be deleted.
    #[error("field type {0} is a system entry and cannot be deleted")]
    SystemImmutable(FieldTypeKey),
    /// Storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Registry Service
// ============================================================================

/// Field type registry over a storage backend.
pub struct FieldTypeRegistry<S> {
    /// Backing field type store.
    store: S,
}

impl<S: FieldTypeStore> FieldTypeRegistry<S> {
    /// Creates a registry over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Seeds the system catalog, skipping entries that already exist.
    ///
    /// Seeding is idempotent: re-running against a populated store adds
    /// nothing and alters nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn seed_system_catalog(&self) -> Result<usize, RegistryError> {
        let mut seeded = 0;
        for entry in system_catalog() {
            if self.store.get(&entry.key)?.is_none() {
                self.store.insert(&entry)?;
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Looks up a field type by machine key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn get(&self, key: &FieldTypeKey) -> Result<Option<FieldType>, RegistryError> {
        Ok(self.store.get(key)?)
    }

    /// Looks up a field type by machine key, failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no entry exists.
    pub fn require(&self, key: &FieldTypeKey) -> Result<FieldType, RegistryError> {
        self.get(key)?.ok_or_else(|| RegistryError::NotFound(key.clone()))
    }

    /// Looks up a field type by canonical attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn by_canonical_name(&self, name: &str) -> Result<Option<FieldType>, RegistryError> {
        let entries = self.store.list()?;
        Ok(entries.into_iter().find(|entry| entry.canonical_name == name))
    }

    /// Looks up a field type by alias (case-insensitive exact match).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn by_alias(&self, name: &str) -> Result<Option<FieldType>, RegistryError> {
        let entries = self.store.list()?;
        Ok(entries.into_iter().find(|entry| entry.matches_alias(name)))
    }

    /// Lists every entry ordered by (category, key).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn list(&self) -> Result<Vec<FieldType>, RegistryError> {
        let mut entries = self.store.list()?;
        entries.sort_by(|a, b| {
            (a.category, a.key.as_str()).cmp(&(b.category, b.key.as_str()))
        });
        Ok(entries)
    }

    /// Lists entries in one category, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn list_by_category(
        &self,
        category: FieldCategory,
    ) -> Result<Vec<FieldType>, RegistryError> {
        let entries = self.list()?;
        Ok(entries.into_iter().filter(|entry| entry.category == category).collect())
    }

    /// Lists entries whose mapping is required for publishing.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when the store fails.
    pub fn list_required(&self) -> Result<Vec<FieldType>, RegistryError> {
        let entries = self.list()?;
        Ok(entries.into_iter().filter(|entry| entry.required).collect())
    }

    /// Registers a custom field type.
    ///
    /// The system flag is forced off; uniqueness of machine key and
    /// canonical name is validated before insertion.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] or
    /// [`RegistryError::DuplicateCanonicalName`] on a uniqueness conflict.
    pub fn create_custom(&self, mut entry: FieldType) -> Result<FieldType, RegistryError> {
        if self.store.get(&entry.key)?.is_some() {
            return Err(RegistryError::DuplicateKey(entry.key));
        }
        if let Some(existing) = self.by_canonical_name(&entry.canonical_name)? {
            return Err(RegistryError::DuplicateCanonicalName {
                canonical_name: entry.canonical_name,
                existing_key: existing.key,
            });
        }
        entry.system = false;
        self.store.insert(&entry)?;
        Ok(entry)
    }

    /// Deletes a custom field type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SystemImmutable`] for seeded entries and
    /// [`RegistryError::NotFound`] for unknown keys.
    pub fn delete_custom(&self, key: &FieldTypeKey) -> Result<(), RegistryError> {
        let entry = self.require(key)?;
        if entry.system {
            return Err(RegistryError::SystemImmutable(key.clone()));
        }
        self.store.delete(key)?;
        Ok(())
    }
}
