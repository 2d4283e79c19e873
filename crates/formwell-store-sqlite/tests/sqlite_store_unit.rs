// crates/formwell-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Tests for the durable SQLite storage implementation.
// Purpose: Validate round-trips, lookups, flag atomics, and fail-closed loads.
// Dependencies: formwell-core, formwell-store-sqlite, rusqlite, tempfile
// ============================================================================
//! ## Overview
//! Ensures every entity round-trips through the `SQLite` store, indexed
//! lookups resolve, compound flag sequences hold their invariants, and a
//! tampered payload fails closed on load.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use formwell_core::CanonicalAttributes;
use formwell_core::DefinitionStore;
use formwell_core::FieldTypeRegistry;
use formwell_core::FieldTypeKey;
use formwell_core::FormCategory;
use formwell_core::FormDefinition;
use formwell_core::FormId;
use formwell_core::FormStatus;
use formwell_core::FormVersion;
use formwell_core::Language;
use formwell_core::PatientId;
use formwell_core::PatientRecord;
use formwell_core::PatientStore;
use formwell_core::SignatureId;
use formwell_core::SignatureRecord;
use formwell_core::SignatureStore;
use formwell_core::StoreError;
use formwell_core::Timestamp;
use formwell_core::Translation;
use formwell_core::TranslationBundle;
use formwell_core::TranslationStore;
use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::hash_bytes;
use formwell_store_sqlite::SqliteStore;
use formwell_store_sqlite::SqliteStoreConfig;
use serde_json::json;
use tempfile::TempDir;

fn open_store() -> (SqliteStore, TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("formwell.db");
    let store = SqliteStore::open(&SqliteStoreConfig::for_path(&path)).expect("open store");
    (store, dir, path)
}

fn sample_definition(id: &str) -> FormDefinition {
    FormDefinition {
        id: FormId::new(id),
        name: "New Patient Intake".to_string(),
        category: FormCategory::Anamnesis,
        version: FormVersion::new("1.0.0"),
        status: FormStatus::Draft,
        is_active: false,
        is_default: false,
        data_schema: json!({
            "type": "object",
            "properties": {"firstName": {"type": "string"}}
        }),
        layout_schema: json!({}),
        field_mappings: BTreeMap::new(),
        created_at: Timestamp::from_unix_millis(1_000),
        published_at: None,
        published_by: None,
    }
}

fn sample_patient(id: &str, email: &str, created: i64) -> PatientRecord {
    let canonical = CanonicalAttributes {
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        birth_date: Some("1990-05-13".to_string()),
        email: Some(email.to_string()),
        ..CanonicalAttributes::default()
    };
    PatientRecord {
        id: PatientId::new(id),
        canonical,
        custom: BTreeMap::new(),
        created_at: Timestamp::from_unix_millis(created),
    }
}

/// Verifies definitions round-trip with their schemas intact.
#[test]
fn definition_roundtrip() {
    let (store, _dir, _) = open_store();
    let definition = sample_definition("form-1");
    DefinitionStore::insert(&store, &definition).unwrap();
    let loaded = DefinitionStore::get(&store, &FormId::new("form-1")).unwrap();
    assert_eq!(loaded, Some(definition));
}

/// Verifies duplicate definition inserts surface a conflict.
#[test]
fn duplicate_definition_is_a_conflict() {
    let (store, _dir, _) = open_store();
    let definition = sample_definition("form-1");
    DefinitionStore::insert(&store, &definition).unwrap();
    assert!(matches!(
        DefinitionStore::insert(&store, &definition).unwrap_err(),
        StoreError::Conflict(_)
    ));
}

/// Verifies category and status lookups use the indexed columns.
#[test]
fn definition_lookups_by_category_and_status() {
    let (store, _dir, _) = open_store();
    DefinitionStore::insert(&store, &sample_definition("form-1")).unwrap();
    let mut consent = sample_definition("form-2");
    consent.category = FormCategory::Consent;
    consent.status = FormStatus::Published;
    DefinitionStore::insert(&store, &consent).unwrap();

    let anamnesis = store.list_by_category(FormCategory::Anamnesis).unwrap();
    assert_eq!(anamnesis.len(), 1);
    assert_eq!(anamnesis[0].id.as_str(), "form-1");

    let published = store.list_by_status(FormStatus::Published).unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id.as_str(), "form-2");
}

/// Verifies the default flag sequence is exclusive within a category.
#[test]
fn set_default_is_exclusive_within_category() {
    let (store, _dir, _) = open_store();
    DefinitionStore::insert(&store, &sample_definition("form-1")).unwrap();
    DefinitionStore::insert(&store, &sample_definition("form-2")).unwrap();
    store.set_default(&FormId::new("form-1"), FormCategory::Anamnesis).unwrap();
    store.set_default(&FormId::new("form-2"), FormCategory::Anamnesis).unwrap();

    let defaults: Vec<String> = store
        .list_by_category(FormCategory::Anamnesis)
        .unwrap()
        .into_iter()
        .filter(|definition| definition.is_default)
        .map(|definition| definition.id.as_str().to_string())
        .collect();
    assert_eq!(defaults, vec!["form-2".to_string()]);
}

/// Verifies the active flag sequence deactivates category peers.
#[test]
fn set_active_deactivates_peers() {
    let (store, _dir, _) = open_store();
    DefinitionStore::insert(&store, &sample_definition("form-1")).unwrap();
    DefinitionStore::insert(&store, &sample_definition("form-2")).unwrap();
    store.set_active(&FormId::new("form-1"), FormCategory::Anamnesis, false).unwrap();
    store.set_active(&FormId::new("form-2"), FormCategory::Anamnesis, true).unwrap();

    let active: Vec<String> = store
        .list_by_category(FormCategory::Anamnesis)
        .unwrap()
        .into_iter()
        .filter(|definition| definition.is_active)
        .map(|definition| definition.id.as_str().to_string())
        .collect();
    assert_eq!(active, vec!["form-2".to_string()]);
}

/// Verifies translations are unique per (form, language).
#[test]
fn translation_uniqueness_per_form_language() {
    let (store, _dir, _) = open_store();
    DefinitionStore::insert(&store, &sample_definition("form-1")).unwrap();
    let translation = Translation {
        form_id: FormId::new("form-1"),
        language: Language::De,
        bundle: TranslationBundle::default(),
    };
    TranslationStore::insert(&store, &translation).unwrap();
    assert!(matches!(
        TranslationStore::insert(&store, &translation).unwrap_err(),
        StoreError::Conflict(_)
    ));
    let listed = store.list_for_form(&FormId::new("form-1")).unwrap();
    assert_eq!(listed.len(), 1);
}

/// Verifies the seeded registry works on top of the SQLite store.
#[test]
fn registry_seeds_on_sqlite() {
    let (store, _dir, _) = open_store();
    let registry = FieldTypeRegistry::new(store);
    let first = registry.seed_system_catalog().unwrap();
    assert!(first > 0);
    assert_eq!(registry.seed_system_catalog().unwrap(), 0);
    let entry = registry.require(&FieldTypeKey::new("FIRST_NAME")).unwrap();
    assert_eq!(entry.canonical_name, "firstName");
}

/// Verifies patient identifier allocation is monotonic.
#[test]
fn patient_id_allocation_is_monotonic() {
    let (store, _dir, _) = open_store();
    let first = store.allocate_id().unwrap();
    let second = store.allocate_id().unwrap();
    assert_ne!(first, second);
}

/// Verifies patient email and identity lookups resolve.
#[test]
fn patient_lookups_resolve() {
    let (store, _dir, _) = open_store();
    PatientStore::insert(&store, &sample_patient("patient-1", "jane.doe@example.org", 1_000)).unwrap();
    PatientStore::insert(&store, &sample_patient("patient-2", "jane.doe@example.org", 2_000)).unwrap();

    let by_email = store.find_by_email("Jane.Doe@Example.org").unwrap();
    assert_eq!(by_email.len(), 2);

    let by_identity = store.find_by_identity("jane", "doe", "1990-05-13").unwrap();
    assert_eq!(by_identity.len(), 2);

    let missing = store.find_by_identity("john", "doe", "1990-05-13").unwrap();
    assert!(missing.is_empty());
}

/// Verifies signature windows filter by capture time.
#[test]
fn signature_window_filters_by_capture_time() {
    let (store, _dir, _) = open_store();
    let record = |id: &str, at: i64| SignatureRecord {
        id: SignatureId::new(id),
        patient_id: PatientId::new("patient-1"),
        submission_id: formwell_core::SubmissionId::new("sub-1"),
        signer_name: "Jane Doe".to_string(),
        media_type: "image/png".to_string(),
        content_hash: hash_bytes(DEFAULT_HASH_ALGORITHM, b"signature"),
        captured_at: Timestamp::from_unix_millis(at),
    };
    store.store(&record("sig-1", 100_000), b"payload").unwrap();
    store.store(&record("sig-2", 900_000), b"payload").unwrap();

    let within = store
        .list_in_window(&PatientId::new("patient-1"), Timestamp::from_unix_millis(120_000), 60_000)
        .unwrap();
    assert_eq!(within.len(), 1);
    assert_eq!(within[0].id.as_str(), "sig-1");
}

/// Verifies a tampered payload fails closed on load.
#[test]
fn tampered_payload_fails_closed() {
    let (store, _dir, path) = open_store();
    DefinitionStore::insert(&store, &sample_definition("form-1")).unwrap();
    drop(store);

    // Corrupt the stored payload directly, keeping the stale hash.
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE form_definitions SET payload = X'7b7d' WHERE form_id = 'form-1'",
            [],
        )
        .unwrap();
    drop(connection);

    let store = SqliteStore::open(&SqliteStoreConfig::for_path(&path)).unwrap();
    let err = DefinitionStore::get(&store, &FormId::new("form-1")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}
