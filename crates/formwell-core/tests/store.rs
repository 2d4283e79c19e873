// crates/formwell-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Tests for the in-memory storage implementations.
// Purpose: Validate round-trips and atomic flag sequences.
// Dependencies: formwell-core
// ============================================================================
//! ## Overview
//! Ensures the in-memory stores return saved records, reject duplicates,
//! and run the clear-then-set flag sequences without leaving two holders.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::sample_definition;
use formwell_core::DefinitionStore;
use formwell_core::FormCategory;
use formwell_core::FormDefinition;
use formwell_core::FormId;
use formwell_core::FormStatus;
use formwell_core::InMemoryDefinitionStore;
use formwell_core::StoreError;
use formwell_core::Timestamp;

fn stored(id: &str, category: FormCategory) -> FormDefinition {
    let request = sample_definition(id, category);
    FormDefinition {
        id: request.id,
        name: request.name,
        category: request.category,
        version: request.version,
        status: FormStatus::Draft,
        is_active: false,
        is_default: false,
        data_schema: request.data_schema,
        layout_schema: request.layout_schema,
        field_mappings: request.field_mappings,
        created_at: Timestamp::from_unix_millis(1_000),
        published_at: None,
        published_by: None,
    }
}

/// Verifies saving then loading a definition succeeds.
#[test]
fn definition_save_and_load_roundtrip() {
    let store = InMemoryDefinitionStore::new();
    let definition = stored("form-1", FormCategory::Anamnesis);
    store.insert(&definition).unwrap();
    let loaded = store.get(&FormId::new("form-1")).unwrap();
    assert_eq!(loaded, Some(definition));
}

/// Verifies loading a missing definition returns None.
#[test]
fn missing_definition_returns_none() {
    let store = InMemoryDefinitionStore::new();
    assert!(store.get(&FormId::new("missing")).unwrap().is_none());
}

/// Verifies duplicate inserts surface a conflict.
#[test]
fn duplicate_insert_is_a_conflict() {
    let store = InMemoryDefinitionStore::new();
    let definition = stored("form-1", FormCategory::Anamnesis);
    store.insert(&definition).unwrap();
    assert!(matches!(store.insert(&definition).unwrap_err(), StoreError::Conflict(_)));
}

/// Verifies the default flag sequence leaves exactly one holder.
#[test]
fn set_default_is_exclusive_within_category() {
    let store = InMemoryDefinitionStore::new();
    store.insert(&stored("form-1", FormCategory::Anamnesis)).unwrap();
    store.insert(&stored("form-2", FormCategory::Anamnesis)).unwrap();
    store.insert(&stored("form-3", FormCategory::Consent)).unwrap();

    store.set_default(&FormId::new("form-1"), FormCategory::Anamnesis).unwrap();
    store.set_default(&FormId::new("form-2"), FormCategory::Anamnesis).unwrap();
    store.set_default(&FormId::new("form-3"), FormCategory::Consent).unwrap();

    let anamnesis_defaults: Vec<String> = store
        .list_by_category(FormCategory::Anamnesis)
        .unwrap()
        .into_iter()
        .filter(|definition| definition.is_default)
        .map(|definition| definition.id.as_str().to_string())
        .collect();
    assert_eq!(anamnesis_defaults, vec!["form-2".to_string()]);

    // The other category keeps its own default untouched.
    let consent = store.get(&FormId::new("form-3")).unwrap().unwrap();
    assert!(consent.is_default);
}

/// Verifies the active flag sequence deactivates category peers only.
#[test]
fn set_active_deactivates_peers_only_when_asked() {
    let store = InMemoryDefinitionStore::new();
    store.insert(&stored("form-1", FormCategory::Anamnesis)).unwrap();
    store.insert(&stored("form-2", FormCategory::Anamnesis)).unwrap();

    store.set_active(&FormId::new("form-1"), FormCategory::Anamnesis, false).unwrap();
    store.set_active(&FormId::new("form-2"), FormCategory::Anamnesis, false).unwrap();
    let active_count = store
        .list_by_category(FormCategory::Anamnesis)
        .unwrap()
        .into_iter()
        .filter(|definition| definition.is_active)
        .count();
    assert_eq!(active_count, 2);

    store.set_active(&FormId::new("form-1"), FormCategory::Anamnesis, true).unwrap();
    let active: Vec<String> = store
        .list_by_category(FormCategory::Anamnesis)
        .unwrap()
        .into_iter()
        .filter(|definition| definition.is_active)
        .map(|definition| definition.id.as_str().to_string())
        .collect();
    assert_eq!(active, vec!["form-1".to_string()]);
}

/// Verifies flag operations fail closed on unknown identifiers.
#[test]
fn flag_operations_require_an_existing_target() {
    let store = InMemoryDefinitionStore::new();
    assert!(matches!(
        store.set_default(&FormId::new("missing"), FormCategory::Anamnesis).unwrap_err(),
        StoreError::Invalid(_)
    ));
    assert!(matches!(
        store.set_active(&FormId::new("missing"), FormCategory::Anamnesis, true).unwrap_err(),
        StoreError::Invalid(_)
    ));
}
