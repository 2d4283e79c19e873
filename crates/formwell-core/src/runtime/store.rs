// crates/formwell-core/src/runtime/store.rs
// ============================================================================
// Module: Formwell In-Memory Stores
// Description: Simple in-memory storage implementations for tests and demos.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of every Formwell
//! storage interface for tests and local demos. They are not intended for
//! production use. Compound flag operations run under a single mutex
//! guard, which gives them the same atomicity the durable store provides
//! through transactions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

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
use crate::core::Translation;
use crate::interfaces::DefinitionStore;
use crate::interfaces::FieldTypeStore;
use crate::interfaces::PatientStore;
use crate::interfaces::SignatureError;
use crate::interfaces::SignatureStore;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::TranslationStore;

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Maps a poisoned mutex into a store error.
fn poisoned() -> StoreError {
    StoreError::Store("in-memory store mutex poisoned".to_string())
}

/// Builds the unique key for a (form, language) translation pair.
fn translation_key(form_id: &FormId, language: Language) -> String {
    format!("{form_id}/{language}")
}

// ============================================================================
// SECTION: Definition Store
// ============================================================================

/// In-memory definition store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDefinitionStore {
    /// Definition map protected by a mutex.
    definitions: Arc<Mutex<BTreeMap<String, FormDefinition>>>,
}

impl InMemoryDefinitionStore {
    /// Creates a new in-memory definition store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn insert(&self, definition: &FormDefinition) -> Result<(), StoreError> {
        let mut guard = self.definitions.lock().map_err(|_| poisoned())?;
        if guard.contains_key(definition.id.as_str()) {
            return Err(StoreError::Conflict(format!(
                "definition {} already exists",
                definition.id
            )));
        }
        guard.insert(definition.id.as_str().to_string(), definition.clone());
        Ok(())
    }

    fn update(&self, definition: &FormDefinition) -> Result<(), StoreError> {
        let mut guard = self.definitions.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(definition.id.as_str()) {
            return Err(StoreError::Invalid(format!("definition {} does not exist", definition.id)));
        }
        guard.insert(definition.id.as_str().to_string(), definition.clone());
        Ok(())
    }

    fn delete(&self, id: &FormId) -> Result<(), StoreError> {
        let mut guard = self.definitions.lock().map_err(|_| poisoned())?;
        guard.remove(id.as_str());
        Ok(())
    }

    fn get(&self, id: &FormId) -> Result<Option<FormDefinition>, StoreError> {
        let guard = self.definitions.lock().map_err(|_| poisoned())?;
        Ok(guard.get(id.as_str()).cloned())
    }

    fn list_by_category(
        &self,
        category: FormCategory,
    ) -> Result<Vec<FormDefinition>, StoreError> {
        let guard = self.definitions.lock().map_err(|_| poisoned())?;
        Ok(guard.values().filter(|definition| definition.category == category).cloned().collect())
    }

    fn list_by_status(&self, status: FormStatus) -> Result<Vec<FormDefinition>, StoreError> {
        let guard = self.definitions.lock().map_err(|_| poisoned())?;
        Ok(guard.values().filter(|definition| definition.status == status).cloned().collect())
    }

    fn set_default(&self, keep: &FormId, category: FormCategory) -> Result<(), StoreError> {
        let mut guard = self.definitions.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(keep.as_str()) {
            return Err(StoreError::Invalid(format!("definition {keep} does not exist")));
        }
        for definition in guard.values_mut() {
            if definition.category == category {
                definition.is_default = definition.id == *keep;
            }
        }
        Ok(())
    }

    fn set_active(
        &self,
        keep: &FormId,
        category: FormCategory,
        deactivate_others: bool,
    ) -> Result<(), StoreError> {
        let mut guard = self.definitions.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(keep.as_str()) {
            return Err(StoreError::Invalid(format!("definition {keep} does not exist")));
        }
        for definition in guard.values_mut() {
            if definition.id == *keep {
                definition.is_active = true;
            } else if deactivate_others && definition.category == category {
                definition.is_active = false;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Translation Store
// ============================================================================

/// In-memory translation store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTranslationStore {
    /// Translation map protected by a mutex, keyed by (form, language).
    translations: Arc<Mutex<BTreeMap<String, Translation>>>,
}

impl InMemoryTranslationStore {
    /// Creates a new in-memory translation store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranslationStore for InMemoryTranslationStore {
    fn insert(&self, translation: &Translation) -> Result<(), StoreError> {
        let key = translation_key(&translation.form_id, translation.language);
        let mut guard = self.translations.lock().map_err(|_| poisoned())?;
        if guard.contains_key(&key) {
            return Err(StoreError::Conflict(format!("translation {key} already exists")));
        }
        guard.insert(key, translation.clone());
        Ok(())
    }

    fn update(&self, translation: &Translation) -> Result<(), StoreError> {
        let key = translation_key(&translation.form_id, translation.language);
        let mut guard = self.translations.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(&key) {
            return Err(StoreError::Invalid(format!("translation {key} does not exist")));
        }
        guard.insert(key, translation.clone());
        Ok(())
    }

    fn get(
        &self,
        form_id: &FormId,
        language: Language,
    ) -> Result<Option<Translation>, StoreError> {
        let guard = self.translations.lock().map_err(|_| poisoned())?;
        Ok(guard.get(&translation_key(form_id, language)).cloned())
    }

    fn list_for_form(&self, form_id: &FormId) -> Result<Vec<Translation>, StoreError> {
        let guard = self.translations.lock().map_err(|_| poisoned())?;
        Ok(guard.values().filter(|translation| translation.form_id == *form_id).cloned().collect())
    }

    fn delete(&self, form_id: &FormId, language: Language) -> Result<(), StoreError> {
        let mut guard = self.translations.lock().map_err(|_| poisoned())?;
        guard.remove(&translation_key(form_id, language));
        Ok(())
    }
}

// ============================================================================
// SECTION: Field Type Store
// ============================================================================

/// In-memory field type store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFieldTypeStore {
    /// Entry map protected by a mutex, keyed by machine key.
    entries: Arc<Mutex<BTreeMap<String, FieldType>>>,
}

impl InMemoryFieldTypeStore {
    /// Creates a new in-memory field type store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldTypeStore for InMemoryFieldTypeStore {
    fn insert(&self, field_type: &FieldType) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        if guard.contains_key(field_type.key.as_str()) {
            return Err(StoreError::Conflict(format!(
                "field type {} already exists",
                field_type.key
            )));
        }
        guard.insert(field_type.key.as_str().to_string(), field_type.clone());
        Ok(())
    }

    fn get(&self, key: &FieldTypeKey) -> Result<Option<FieldType>, StoreError> {
        let guard = self.entries.lock().map_err(|_| poisoned())?;
        Ok(guard.get(key.as_str()).cloned())
    }

    fn list(&self) -> Result<Vec<FieldType>, StoreError> {
        let guard = self.entries.lock().map_err(|_| poisoned())?;
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, key: &FieldTypeKey) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().map_err(|_| poisoned())?;
        guard.remove(key.as_str());
        Ok(())
    }
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// In-memory submission store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionStore {
    /// Submission map protected by a mutex.
    submissions: Arc<Mutex<BTreeMap<String, Submission>>>,
}

impl InMemorySubmissionStore {
    /// Creates a new in-memory submission store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn insert(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut guard = self.submissions.lock().map_err(|_| poisoned())?;
        if guard.contains_key(submission.id.as_str()) {
            return Err(StoreError::Conflict(format!(
                "submission {} already exists",
                submission.id
            )));
        }
        guard.insert(submission.id.as_str().to_string(), submission.clone());
        Ok(())
    }

    fn update(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut guard = self.submissions.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(submission.id.as_str()) {
            return Err(StoreError::Invalid(format!(
                "submission {} does not exist",
                submission.id
            )));
        }
        guard.insert(submission.id.as_str().to_string(), submission.clone());
        Ok(())
    }

    fn get(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        let guard = self.submissions.lock().map_err(|_| poisoned())?;
        Ok(guard.get(id.as_str()).cloned())
    }

    fn list_for_patient(&self, patient_id: &PatientId) -> Result<Vec<Submission>, StoreError> {
        let guard = self.submissions.lock().map_err(|_| poisoned())?;
        Ok(guard
            .values()
            .filter(|submission| submission.patient_id == *patient_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Patient Store
// ============================================================================

/// In-memory patient store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPatientStore {
    /// Patient map protected by a mutex.
    patients: Arc<Mutex<BTreeMap<String, PatientRecord>>>,
    /// Monotonic identifier counter.
    next_id: Arc<Mutex<u64>>,
}

impl InMemoryPatientStore {
    /// Creates a new in-memory patient store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientStore for InMemoryPatientStore {
    fn allocate_id(&self) -> Result<PatientId, StoreError> {
        let mut guard = self.next_id.lock().map_err(|_| poisoned())?;
        *guard += 1;
        Ok(PatientId::new(format!("patient-{}", *guard)))
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError> {
        let mut guard = self.patients.lock().map_err(|_| poisoned())?;
        if guard.contains_key(record.id.as_str()) {
            return Err(StoreError::Conflict(format!("patient {} already exists", record.id)));
        }
        guard.insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn update(&self, record: &PatientRecord) -> Result<(), StoreError> {
        let mut guard = self.patients.lock().map_err(|_| poisoned())?;
        if !guard.contains_key(record.id.as_str()) {
            return Err(StoreError::Invalid(format!("patient {} does not exist", record.id)));
        }
        guard.insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn get(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError> {
        let guard = self.patients.lock().map_err(|_| poisoned())?;
        Ok(guard.get(id.as_str()).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<PatientRecord>, StoreError> {
        let needle = email.trim().to_ascii_lowercase();
        let guard = self.patients.lock().map_err(|_| poisoned())?;
        Ok(guard
            .values()
            .filter(|record| {
                record
                    .canonical
                    .email
                    .as_deref()
                    .is_some_and(|stored| stored.trim().to_ascii_lowercase() == needle)
            })
            .cloned()
            .collect())
    }

    fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: &str,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let first = first_name.trim().to_ascii_lowercase();
        let last = last_name.trim().to_ascii_lowercase();
        let guard = self.patients.lock().map_err(|_| poisoned())?;
        Ok(guard
            .values()
            .filter(|record| {
                let canonical = &record.canonical;
                canonical
                    .first_name
                    .as_deref()
                    .is_some_and(|stored| stored.trim().to_ascii_lowercase() == first)
                    && canonical
                        .last_name
                        .as_deref()
                        .is_some_and(|stored| stored.trim().to_ascii_lowercase() == last)
                    && canonical.birth_date.as_deref() == Some(birth_date)
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Signature Store
// ============================================================================

/// In-memory signature store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemorySignatureStore {
    /// Records and payloads protected by a mutex.
    records: Arc<Mutex<Vec<(SignatureRecord, Vec<u8>)>>>,
}

impl InMemorySignatureStore {
    /// Creates a new in-memory signature store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored payload for a signature, if any (test helper).
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when the store mutex is poisoned.
    pub fn payload(&self, id: &crate::core::SignatureId) -> Result<Option<Vec<u8>>, SignatureError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| SignatureError::Store("signature store mutex poisoned".to_string()))?;
        Ok(guard.iter().find(|(record, _)| record.id == *id).map(|(_, bytes)| bytes.clone()))
    }
}

impl SignatureStore for InMemorySignatureStore {
    fn store(&self, record: &SignatureRecord, bytes: &[u8]) -> Result<(), SignatureError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| SignatureError::Store("signature store mutex poisoned".to_string()))?;
        guard.push((record.clone(), bytes.to_vec()));
        Ok(())
    }

    fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<SignatureRecord>, SignatureError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| SignatureError::Store("signature store mutex poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|(record, _)| record.patient_id == *patient_id)
            .map(|(record, _)| record.clone())
            .collect())
    }
}
