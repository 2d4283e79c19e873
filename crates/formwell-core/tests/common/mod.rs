// crates/formwell-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Shared builders for definitions, stores, and services.
// Purpose: Keep integration tests focused on behavior, not setup.
// Dependencies: formwell-core, serde_json
// ============================================================================
//! ## Overview
//! Builders for a representative intake definition (identity fields, a
//! radio choice, a textarea, a consent toggle, and a signature pad) plus
//! wired-up in-memory services.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Test-only fixtures; not every test uses every helper."
)]

use std::collections::BTreeMap;

use formwell_core::FieldTypeKey;
use formwell_core::FieldTypeRegistry;
use formwell_core::FormCategory;
use formwell_core::FormDefinition;
use formwell_core::FormId;
use formwell_core::FormManager;
use formwell_core::FormVersion;
use formwell_core::InMemoryDefinitionStore;
use formwell_core::InMemoryFieldTypeStore;
use formwell_core::InMemoryPatientStore;
use formwell_core::InMemorySignatureStore;
use formwell_core::InMemorySubmissionStore;
use formwell_core::InMemoryTranslationStore;
use formwell_core::NewDefinition;
use formwell_core::NoopAuditSink;
use formwell_core::NoopCacheHook;
use formwell_core::SubmissionCanonicalizer;
use formwell_core::Timestamp;
use serde_json::Value;
use serde_json::json;

/// Fully wired in-memory engine for tests.
pub type TestManager = FormManager<
    InMemoryDefinitionStore,
    InMemoryTranslationStore,
    InMemoryFieldTypeStore,
    NoopCacheHook,
    NoopAuditSink,
>;

/// Fully wired in-memory canonicalizer for tests.
pub type TestCanonicalizer = SubmissionCanonicalizer<
    InMemoryPatientStore,
    InMemorySignatureStore,
    InMemorySubmissionStore,
    InMemoryFieldTypeStore,
    NoopAuditSink,
>;

/// Returns a representative intake data schema.
pub fn sample_data_schema() -> Value {
    json!({
        "type": "object",
        "required": ["firstName", "lastName", "birthDate", "email"],
        "properties": {
            "firstName": {"type": "string", "minLength": 2, "maxLength": 60},
            "lastName": {"type": "string", "minLength": 2, "maxLength": 60},
            "birthDate": {"type": "string", "format": "date"},
            "email": {"type": "string", "format": "email"},
            "phone": {"type": "string", "format": "phone"},
            "smoker": {"type": "boolean"},
            "bloodType": {
                "type": "string",
                "enum": ["a", "b", "ab", "0"],
                "enumNames": ["A", "B", "AB", "0"]
            },
            "allergies": {"type": "string", "title": "Known Allergies"},
            "notes": {"type": "string"},
            "privacyConsent": {"type": "boolean"},
            "patientSignature": {"type": "string", "format": "signature"}
        }
    })
}

/// Returns the layout schema matching [`sample_data_schema`].
pub fn sample_layout_schema() -> Value {
    json!({
        "ui:order": [
            "firstName", "lastName", "birthDate", "email", "phone", "bloodType",
            "smoker", "allergies", "notes", "privacyConsent", "patientSignature"
        ],
        "bloodType": {"ui:widget": "radio"},
        "notes": {"ui:widget": "textarea", "ui:placeholder": "Anything else?"},
        "email": {"ui:help": "We only use this for appointment reminders."}
    })
}

/// Returns the mapping table matching [`sample_data_schema`].
pub fn sample_mappings() -> BTreeMap<String, FieldTypeKey> {
    let mut mappings = BTreeMap::new();
    mappings.insert("firstName".to_string(), FieldTypeKey::new("FIRST_NAME"));
    mappings.insert("lastName".to_string(), FieldTypeKey::new("LAST_NAME"));
    mappings.insert("birthDate".to_string(), FieldTypeKey::new("BIRTH_DATE"));
    mappings.insert("email".to_string(), FieldTypeKey::new("EMAIL"));
    mappings.insert("phone".to_string(), FieldTypeKey::new("PHONE"));
    mappings.insert("patientSignature".to_string(), FieldTypeKey::new("SIGNATURE"));
    mappings
}

/// Returns a create request for the sample definition.
pub fn sample_definition(id: &str, category: FormCategory) -> NewDefinition {
    NewDefinition {
        id: FormId::new(id),
        name: "New Patient Intake".to_string(),
        category,
        version: FormVersion::new("1.0.0"),
        data_schema: sample_data_schema(),
        layout_schema: sample_layout_schema(),
        field_mappings: sample_mappings(),
        is_default: false,
    }
}

/// Builds a manager over fresh in-memory stores with a seeded registry.
pub fn manager() -> (TestManager, InMemoryFieldTypeStore) {
    let field_types = InMemoryFieldTypeStore::new();
    let registry = FieldTypeRegistry::new(field_types.clone());
    registry.seed_system_catalog().expect("seed catalog");
    let manager = FormManager::new(
        InMemoryDefinitionStore::new(),
        InMemoryTranslationStore::new(),
        registry,
        NoopCacheHook,
        NoopAuditSink,
    );
    (manager, field_types)
}

/// Builds a canonicalizer over fresh in-memory stores with a seeded registry.
pub fn canonicalizer() -> (TestCanonicalizer, InMemoryPatientStore, InMemorySignatureStore) {
    let field_types = InMemoryFieldTypeStore::new();
    let registry = FieldTypeRegistry::new(field_types);
    registry.seed_system_catalog().expect("seed catalog");
    let patients = InMemoryPatientStore::new();
    let signatures = InMemorySignatureStore::new();
    let canonicalizer = SubmissionCanonicalizer::new(
        patients.clone(),
        signatures.clone(),
        InMemorySubmissionStore::new(),
        registry,
        NoopAuditSink,
    );
    (canonicalizer, patients, signatures)
}

/// Builds a published sample definition through the manager.
pub fn published_definition(manager: &TestManager, id: &str) -> FormDefinition {
    manager
        .create(sample_definition(id, FormCategory::Anamnesis), Timestamp::from_unix_millis(1_000))
        .expect("create definition");
    manager
        .publish(&FormId::new(id), "dr-adams", true, Timestamp::from_unix_millis(2_000))
        .expect("publish definition")
}
