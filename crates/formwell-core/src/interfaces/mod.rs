// crates/formwell-core/src/interfaces/mod.rs
// ============================================================================
// Module: Formwell Interfaces
// Description: Backend-agnostic interfaces for storage, rasterizing, signatures.
// Purpose: Define the contract surfaces used by the Formwell runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the form engine integrates with its collaborators
//! without embedding backend-specific details. Every public operation of
//! the engine executes against these traits inside a single request-scoped
//! transaction supplied by the implementation; compound operations (clear
//! default, deactivate peers) are trait methods so implementations can run
//! them atomically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::FieldType;
use crate::core::FieldTypeKey;
use crate::core::FormCategory;
use crate::core::FormDefinition;
use crate::core::FormId;
use crate::core::FormStatus;
use crate::core::Language;
use crate::core::PatientId;
use crate::core::PatientRecord;
use crate::core::SignatureRecord;
use crate::core::Submission;
use crate::core::SubmissionId;
use crate::core::Timestamp;
use crate::core::Translation;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Storage collaborator errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Uniqueness conflict (duplicate identifier or key).
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Definition Store
// ============================================================================

/// Storage for form definitions.
///
/// Compound flag operations execute atomically so the "at most one
/// default/active per category" invariants never observe a partial state.
pub trait DefinitionStore {
    /// Inserts a new definition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier already exists.
    fn insert(&self, definition: &FormDefinition) -> Result<(), StoreError>;

    /// Replaces a stored definition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the definition does not exist.
    fn update(&self, definition: &FormDefinition) -> Result<(), StoreError>;

    /// Deletes a definition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, id: &FormId) -> Result<(), StoreError>;

    /// Loads a definition by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, id: &FormId) -> Result<Option<FormDefinition>, StoreError>;

    /// Lists definitions in a category.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_by_category(&self, category: FormCategory)
    -> Result<Vec<FormDefinition>, StoreError>;

    /// Lists definitions with a status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_by_status(&self, status: FormStatus) -> Result<Vec<FormDefinition>, StoreError>;

    /// Atomically clears the default flag on every definition in the
    /// category except `keep`, then sets it on `keep`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `keep` does not exist.
    fn set_default(&self, keep: &FormId, category: FormCategory) -> Result<(), StoreError>;

    /// Atomically sets the active flag on `keep` and, when
    /// `deactivate_others` is true, clears it on every category peer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `keep` does not exist.
    fn set_active(
        &self,
        keep: &FormId,
        category: FormCategory,
        deactivate_others: bool,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Translation Store
// ============================================================================

/// Storage for per-form translation bundles.
pub trait TranslationStore {
    /// Inserts a new translation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a bundle already exists for
    /// the (form, language) pair.
    fn insert(&self, translation: &Translation) -> Result<(), StoreError>;

    /// Replaces a stored translation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when no bundle exists for the pair.
    fn update(&self, translation: &Translation) -> Result<(), StoreError>;

    /// Loads the bundle for a (form, language) pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, form_id: &FormId, language: Language)
    -> Result<Option<Translation>, StoreError>;

    /// Lists every bundle owned by a form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_for_form(&self, form_id: &FormId) -> Result<Vec<Translation>, StoreError>;

    /// Deletes the bundle for a (form, language) pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, form_id: &FormId, language: Language) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Field Type Store
// ============================================================================

/// Storage for registered field types.
pub trait FieldTypeStore {
    /// Inserts a new field type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the key already exists.
    fn insert(&self, field_type: &FieldType) -> Result<(), StoreError>;

    /// Loads a field type by machine key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, key: &FieldTypeKey) -> Result<Option<FieldType>, StoreError>;

    /// Lists every registered field type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self) -> Result<Vec<FieldType>, StoreError>;

    /// Deletes a field type by machine key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, key: &FieldTypeKey) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Storage for submissions.
pub trait SubmissionStore {
    /// Inserts a new submission.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier already exists.
    fn insert(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Replaces a stored submission.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the submission does not exist.
    fn update(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Loads a submission by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError>;

    /// Lists submissions owned by a patient.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_for_patient(&self, patient_id: &PatientId) -> Result<Vec<Submission>, StoreError>;
}

// ============================================================================
// SECTION: Patient Store
// ============================================================================

/// Storage for patient records.
pub trait PatientStore {
    /// Allocates a fresh patient identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when allocation fails.
    fn allocate_id(&self) -> Result<PatientId, StoreError>;

    /// Inserts a new patient record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier already exists.
    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError>;

    /// Replaces a stored patient record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the record does not exist.
    fn update(&self, record: &PatientRecord) -> Result<(), StoreError>;

    /// Loads a patient by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError>;

    /// Finds patients by contact email (exact, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_by_email(&self, email: &str) -> Result<Vec<PatientRecord>, StoreError>;

    /// Finds patients by the (first name, last name, birth date) tuple.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: &str,
    ) -> Result<Vec<PatientRecord>, StoreError>;
}

// ============================================================================
// SECTION: Signature Store
// ============================================================================

/// Signature store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Signature store reported an error.
    #[error("signature store error: {0}")]
    Store(String),
}

/// Storage for raw signature payloads and capture metadata.
pub trait SignatureStore {
    /// Persists a signature payload with its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when persistence fails.
    fn store(&self, record: &SignatureRecord, bytes: &[u8]) -> Result<(), SignatureError>;

    /// Lists signature metadata owned by a patient.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when the lookup fails.
    fn list_for_patient(&self, patient_id: &PatientId)
    -> Result<Vec<SignatureRecord>, SignatureError>;

    /// Lists signature metadata captured within a time window.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when the lookup fails.
    fn list_in_window(
        &self,
        patient_id: &PatientId,
        around: Timestamp,
        window_millis: i64,
    ) -> Result<Vec<SignatureRecord>, SignatureError> {
        let records = self.list_for_patient(patient_id)?;
        Ok(records
            .into_iter()
            .filter(|record| record.captured_at.within_window(around, window_millis))
            .collect())
    }
}

// ============================================================================
// SECTION: Rasterizer
// ============================================================================

/// Rasterizer errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RasterizeError {
    /// Rasterizer rejected the markup or failed internally.
    #[error("rasterizer error: {0}")]
    Failed(String),
}

/// Black-box markup-to-document rasterizer.
pub trait Rasterizer {
    /// Converts a markup string into document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RasterizeError`] when the markup is malformed or the
    /// rasterizer fails.
    fn rasterize(&self, markup: &str) -> Result<Vec<u8>, RasterizeError>;
}

// ============================================================================
// SECTION: Render Cache Hook
// ============================================================================

/// Invalidation hook notified when a definition mutates.
///
/// Rendered markup is a pure function of (definition, language); caches
/// keyed that way must drop every language entry of a mutated form.
pub trait RenderCacheHook {
    /// Drops cached markup for every language of the form.
    fn invalidate_form(&self, form_id: &FormId);
}

/// No-op cache hook for deployments without a markup cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheHook;

impl RenderCacheHook for NoopCacheHook {
    fn invalidate_form(&self, _form_id: &FormId) {}
}
