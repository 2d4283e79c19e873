// crates/formwell-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Formwell Definition Lifecycle
// Description: Draft/published/archived state machine for form definitions.
// Purpose: Enforce lifecycle transitions and category-scoped invariants.
// Dependencies: crate::{audit, core, interfaces, runtime::registry}
// ============================================================================

//! ## Overview
//! The form manager is the single canonical mutation path for definitions
//! and their translations. Draft is the only mutable status; publishing
//! runs the required-mapping check against the field type registry and
//! fails listing every missing field type. Category-scoped invariants (at
//! most one default, at most one published+active) are enforced through
//! atomic clear-then-set store operations. Every mutation notifies the
//! render cache hook so stale markup is dropped for all languages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::core::DefinitionUpdate;
use crate::core::FieldType;
use crate::core::FormCategory;
use crate::core::FormDefinition;
use crate::core::FormId;
use crate::core::FormStatus;
use crate::core::FormVersion;
use crate::core::Language;
use crate::core::Timestamp;
use crate::core::Translation;
use crate::interfaces::DefinitionStore;
use crate::interfaces::FieldTypeStore;
use crate::interfaces::RenderCacheHook;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;
use crate::runtime::registry::FieldTypeRegistry;
use crate::runtime::registry::RegistryError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// One required field type missing from a definition's mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMapping {
    /// Machine key of the missing field type.
    pub key: String,
    /// Canonical attribute name of the missing field type.
    pub canonical_name: String,
    /// Label translation key of the missing field type.
    pub label_key: String,
}

impl fmt::Display for MissingMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.key, self.canonical_name, self.label_key)
    }
}

/// Lifecycle operation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - No partial mutation remains behind a returned error.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No definition exists under the identifier.
    #[error("unknown form definition: {0}")]
    NotFound(FormId),
    /// Operation is not legal in the definition's current status.
    #[error("cannot {operation} form {form_id} in status {current}", current = .status.as_str())]
    InvalidState {
        /// Target definition.
        form_id: FormId,
        /// Current lifecycle status.
        status: FormStatus,
        /// Rejected operation name.
        operation: &'static str,
    },
    /// Publish failed because required field types are unmapped.
    #[error("publish requires mappings for: {}", format_missing(.0))]
    MissingMappings(Vec<MissingMapping>),
    /// A translation already exists for the (form, language) pair.
    #[error("translation for form {form_id} in language {language} already exists")]
    DuplicateTranslation {
        /// Owning form.
        form_id: FormId,
        /// Conflicting language.
        language: Language,
    },
    /// No translation exists for the (form, language) pair.
    #[error("no translation for form {form_id} in language {language}")]
    TranslationMissing {
        /// Owning form.
        form_id: FormId,
        /// Requested language.
        language: Language,
    },
    /// Field type registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Formats missing mappings for the publish error message.
fn format_missing(missing: &[MissingMapping]) -> String {
    missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Create Request
// ============================================================================

/// Inputs for creating a new draft definition.
#[derive(Debug, Clone)]
pub struct NewDefinition {
    /// Definition identifier.
    pub id: FormId,
    /// Operator-facing name.
    pub name: String,
    /// Form category.
    pub category: FormCategory,
    /// Semantic version string.
    pub version: FormVersion,
    /// JSON-Schema-like data schema.
    pub data_schema: serde_json::Value,
    /// Per-field layout hint document.
    pub layout_schema: serde_json::Value,
    /// Mapping from schema field name to field type key.
    pub field_mappings: std::collections::BTreeMap<String, crate::core::FieldTypeKey>,
    /// True to make this the category default.
    pub is_default: bool,
}

// ============================================================================
// SECTION: Form Manager
// ============================================================================

/// Lifecycle manager over the storage interfaces.
pub struct FormManager<D, T, R, C, A> {
    /// Definition storage.
    definitions: D,
    /// Translation storage.
    translations: T,
    /// Field type registry used for the publish-time mapping check.
    registry: FieldTypeRegistry<R>,
    /// Render cache invalidation hook.
    cache: C,
    /// Audit sink.
    audit: A,
}

impl<D, T, R, C, A> FormManager<D, T, R, C, A>
where
    D: DefinitionStore,
    T: TranslationStore,
    R: FieldTypeStore,
    C: RenderCacheHook,
    A: AuditSink,
{
    /// Creates a manager over the given collaborators.
    #[must_use]
    pub const fn new(
        definitions: D,
        translations: T,
        registry: FieldTypeRegistry<R>,
        cache: C,
        audit: A,
    ) -> Self {
        Self {
            definitions,
            translations,
            registry,
            cache,
            audit,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle transitions
    // ------------------------------------------------------------------

    /// Creates a new definition; every definition starts as an inactive
    /// draft. When `is_default` is set, any existing category default is
    /// cleared atomically before this one takes the flag.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when persistence fails.
    pub fn create(
        &self,
        request: NewDefinition,
        created_at: Timestamp,
    ) -> Result<FormDefinition, LifecycleError> {
        let definition = FormDefinition {
            id: request.id.clone(),
            name: request.name,
            category: request.category,
            version: request.version,
            status: FormStatus::Draft,
            is_active: false,
            is_default: false,
            data_schema: request.data_schema,
            layout_schema: request.layout_schema,
            field_mappings: request.field_mappings,
            created_at,
            published_at: None,
            published_by: None,
        };
        self.definitions.insert(&definition)?;
        if request.is_default {
            self.definitions.set_default(&request.id, request.category)?;
        }
        self.get(&request.id)
    }

    /// Applies an update to a draft definition.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidState`] for non-draft definitions.
    pub fn update(
        &self,
        id: &FormId,
        update: DefinitionUpdate,
    ) -> Result<FormDefinition, LifecycleError> {
        let mut definition = self.get(id)?;
        if !definition.is_draft() {
            return Err(LifecycleError::InvalidState {
                form_id: id.clone(),
                status: definition.status,
                operation: "update",
            });
        }
        if let Some(name) = update.name {
            definition.name = name;
        }
        if let Some(version) = update.version {
            definition.version = version;
        }
        if let Some(data_schema) = update.data_schema {
            definition.data_schema = data_schema;
        }
        if let Some(layout_schema) = update.layout_schema {
            definition.layout_schema = layout_schema;
        }
        if let Some(field_mappings) = update.field_mappings {
            definition.field_mappings = field_mappings;
        }
        if update.is_default == Some(false) {
            definition.is_default = false;
        }
        self.definitions.update(&definition)?;
        if update.is_default == Some(true) {
            self.definitions.set_default(id, definition.category)?;
        }
        self.cache.invalidate_form(id);
        self.get(id)
    }

    /// Deletes a draft definition together with its translations.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidState`] for non-draft definitions.
    pub fn delete(&self, id: &FormId) -> Result<(), LifecycleError> {
        let definition = self.get(id)?;
        if !definition.is_draft() {
            return Err(LifecycleError::InvalidState {
                form_id: id.clone(),
                status: definition.status,
                operation: "delete",
            });
        }
        for translation in self.translations.list_for_form(id)? {
            self.translations.delete(id, translation.language)?;
        }
        self.definitions.delete(id)?;
        self.cache.invalidate_form(id);
        Ok(())
    }

    /// Publishes a draft definition.
    ///
    /// The required-mapping check runs first: every required field type
    /// must appear as a value in the mapping table, otherwise publishing
    /// fails listing each missing entry. On success the publish timestamp
    /// and author are recorded; with `set_active` every other active
    /// published definition in the category is deactivated first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidState`] for non-draft definitions
    /// and [`LifecycleError::MissingMappings`] when the check fails.
    pub fn publish(
        &self,
        id: &FormId,
        published_by: &str,
        set_active: bool,
        published_at: Timestamp,
    ) -> Result<FormDefinition, LifecycleError> {
        let mut definition = self.get(id)?;
        if !definition.is_draft() {
            return Err(LifecycleError::InvalidState {
                form_id: id.clone(),
                status: definition.status,
                operation: "publish",
            });
        }
        let missing = self.missing_required_mappings(&definition)?;
        if !missing.is_empty() {
            return Err(LifecycleError::MissingMappings(missing));
        }
        definition.status = FormStatus::Published;
        definition.published_at = Some(published_at);
        definition.published_by = Some(published_by.to_string());
        self.definitions.update(&definition)?;
        if set_active {
            self.definitions.set_active(id, definition.category, true)?;
        }
        self.audit.record(&AuditEvent::DefinitionPublished {
            form_id: id.clone(),
            published_by: published_by.to_string(),
            published_at,
            activated: set_active,
        });
        self.get(id)
    }

    /// Archives a definition from any status and clears its active flag.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] for unknown definitions.
    pub fn archive(
        &self,
        id: &FormId,
        archived_at: Timestamp,
    ) -> Result<FormDefinition, LifecycleError> {
        let mut definition = self.get(id)?;
        definition.status = FormStatus::Archived;
        definition.is_active = false;
        self.definitions.update(&definition)?;
        self.cache.invalidate_form(id);
        self.audit.record(&AuditEvent::DefinitionArchived {
            form_id: id.clone(),
            archived_at,
        });
        Ok(definition)
    }

    /// Activates a published definition, optionally deactivating peers.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidState`] when the definition is not
    /// published.
    pub fn activate(
        &self,
        id: &FormId,
        deactivate_others: bool,
    ) -> Result<FormDefinition, LifecycleError> {
        let definition = self.get(id)?;
        if !definition.is_published() {
            return Err(LifecycleError::InvalidState {
                form_id: id.clone(),
                status: definition.status,
                operation: "activate",
            });
        }
        self.definitions.set_active(id, definition.category, deactivate_others)?;
        self.get(id)
    }

    /// Clears the active flag of a definition.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] for unknown definitions.
    pub fn deactivate(&self, id: &FormId) -> Result<FormDefinition, LifecycleError> {
        let mut definition = self.get(id)?;
        definition.is_active = false;
        self.definitions.update(&definition)?;
        Ok(definition)
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// Loads a definition, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] for unknown definitions.
    pub fn get(&self, id: &FormId) -> Result<FormDefinition, LifecycleError> {
        self.definitions.get(id)?.ok_or_else(|| LifecycleError::NotFound(id.clone()))
    }

    /// Lists definitions in a category.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn list_by_category(
        &self,
        category: FormCategory,
    ) -> Result<Vec<FormDefinition>, LifecycleError> {
        Ok(self.definitions.list_by_category(category)?)
    }

    /// Lists definitions with a status.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn list_by_status(
        &self,
        status: FormStatus,
    ) -> Result<Vec<FormDefinition>, LifecycleError> {
        Ok(self.definitions.list_by_status(status)?)
    }

    /// Returns the active published definition for a category, if any.
    ///
    /// At most one should exist; if the store holds more, the newest
    /// publish timestamp wins.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn active_published(
        &self,
        category: FormCategory,
    ) -> Result<Option<FormDefinition>, LifecycleError> {
        let candidates = self.definitions.list_by_category(category)?;
        Ok(candidates
            .into_iter()
            .filter(|definition| definition.is_published() && definition.is_active)
            .max_by_key(|definition| definition.published_at))
    }

    /// Lists every published definition, newest publish first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn published_newest_first(&self) -> Result<Vec<FormDefinition>, LifecycleError> {
        let mut published = self.definitions.list_by_status(FormStatus::Published)?;
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(published)
    }

    // ------------------------------------------------------------------
    // Translation ownership
    // ------------------------------------------------------------------

    /// Adds a translation bundle to a form.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::DuplicateTranslation`] when the
    /// (form, language) pair already has a bundle.
    pub fn add_translation(&self, translation: Translation) -> Result<(), LifecycleError> {
        self.get(&translation.form_id)?;
        match self.translations.insert(&translation) {
            Ok(()) => {
                self.cache.invalidate_form(&translation.form_id);
                Ok(())
            }
            Err(StoreError::Conflict(_)) => Err(LifecycleError::DuplicateTranslation {
                form_id: translation.form_id,
                language: translation.language,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces an existing translation bundle.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TranslationMissing`] when no bundle
    /// exists for the pair.
    pub fn update_translation(&self, translation: Translation) -> Result<(), LifecycleError> {
        match self.translations.update(&translation) {
            Ok(()) => {
                self.cache.invalidate_form(&translation.form_id);
                Ok(())
            }
            Err(StoreError::Invalid(_)) => Err(LifecycleError::TranslationMissing {
                form_id: translation.form_id,
                language: translation.language,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the translation for a (form, language) pair, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn translation(
        &self,
        form_id: &FormId,
        language: Language,
    ) -> Result<Option<Translation>, LifecycleError> {
        Ok(self.translations.get(form_id, language)?)
    }

    /// Lists every translation owned by a form.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn list_translations(&self, form_id: &FormId) -> Result<Vec<Translation>, LifecycleError> {
        Ok(self.translations.list_for_form(form_id)?)
    }

    /// Deletes the translation for a (form, language) pair.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store fails.
    pub fn delete_translation(
        &self,
        form_id: &FormId,
        language: Language,
    ) -> Result<(), LifecycleError> {
        self.translations.delete(form_id, language)?;
        self.cache.invalidate_form(form_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Publish checks
    // ------------------------------------------------------------------

    /// Collects required field types absent from the mapping table.
    fn missing_required_mappings(
        &self,
        definition: &FormDefinition,
    ) -> Result<Vec<MissingMapping>, LifecycleError> {
        let required = self.registry.list_required()?;
        let missing = required
            .into_iter()
            .filter(|field_type| !is_mapped(definition, field_type))
            .map(|field_type| MissingMapping {
                key: field_type.key.as_str().to_string(),
                canonical_name: field_type.canonical_name,
                label_key: field_type.label_key,
            })
            .collect();
        Ok(missing)
    }
}

/// Returns true when any mapping entry targets the field type.
fn is_mapped(definition: &FormDefinition, field_type: &FieldType) -> bool {
    definition.field_mappings.values().any(|key| *key == field_type.key)
}
