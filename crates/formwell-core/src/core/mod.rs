// crates/formwell-core/src/core/mod.rs
// ============================================================================
// Module: Formwell Core Data Model
// Description: Canonical data types for the dynamic form engine.
// Purpose: Re-export the core model under one namespace.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core module holds the pure data model: identifiers, languages,
//! form definitions, translations, field types, submissions, patient
//! records, the typed schema model, hashing, and time. Behavior lives in
//! [`crate::runtime`]; collaborator contracts live in [`crate::interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod definition;
pub mod field_type;
pub mod hashing;
pub mod identifiers;
pub mod language;
pub mod patient;
pub mod schema;
pub mod submission;
pub mod time;
pub mod translation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use definition::DefinitionUpdate;
pub use definition::FormCategory;
pub use definition::FormDefinition;
pub use definition::FormStatus;
pub use field_type::CATEGORY_ORDER;
pub use field_type::FieldCategory;
pub use field_type::FieldDataType;
pub use field_type::FieldType;
pub use field_type::system_catalog;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::FieldTypeKey;
pub use identifiers::FormId;
pub use identifiers::FormVersion;
pub use identifiers::PatientId;
pub use identifiers::SignatureId;
pub use identifiers::SubmissionId;
pub use language::ALL_LANGUAGES;
pub use language::Language;
pub use language::TextDirection;
pub use patient::CanonicalAttributes;
pub use patient::PatientRecord;
pub use patient::SignatureRecord;
pub use schema::ChoiceOption;
pub use schema::ChoiceWidget;
pub use schema::FieldHints;
pub use schema::FieldKind;
pub use schema::FieldSpec;
pub use schema::LayoutHints;
pub use schema::NumberConstraints;
pub use schema::SchemaError;
pub use schema::TextConstraints;
pub use schema::collect_schema_issues;
pub use schema::parse_data_schema;
pub use schema::parse_layout_schema;
pub use submission::ArtifactInfo;
pub use submission::Submission;
pub use submission::SubmissionStatus;
pub use time::Timestamp;
pub use translation::Translation;
pub use translation::TranslationBundle;
