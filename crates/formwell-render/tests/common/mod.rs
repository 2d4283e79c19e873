// crates/formwell-render/tests/common/mod.rs
// ============================================================================
// Module: Render Test Fixtures
// Description: Shared definition, submission, and rasterizer fixtures.
// Purpose: Keep render tests focused on output, not setup.
// Dependencies: formwell-core, serde_json
// ============================================================================
//! ## Overview
//! A representative intake definition plus stub rasterizers: one that
//! returns the markup bytes unchanged, one that always fails.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Test-only fixtures; not every test uses every helper."
)]

use std::collections::BTreeMap;

use formwell_core::FieldTypeKey;
use formwell_core::FormCategory;
use formwell_core::FormDefinition;
use formwell_core::FormId;
use formwell_core::FormStatus;
use formwell_core::FormVersion;
use formwell_core::Language;
use formwell_core::PatientId;
use formwell_core::PatientRecord;
use formwell_core::RasterizeError;
use formwell_core::Rasterizer;
use formwell_core::Submission;
use formwell_core::SubmissionId;
use formwell_core::SubmissionStatus;
use formwell_core::Timestamp;
use serde_json::Value;
use serde_json::json;

/// Rasterizer stub returning the markup bytes unchanged.
pub struct EchoRasterizer;

impl Rasterizer for EchoRasterizer {
    fn rasterize(&self, markup: &str) -> Result<Vec<u8>, RasterizeError> {
        Ok(markup.as_bytes().to_vec())
    }
}

/// Rasterizer stub that always rejects the markup.
pub struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, _markup: &str) -> Result<Vec<u8>, RasterizeError> {
        Err(RasterizeError::Failed("broken markup".to_string()))
    }
}

/// Returns a representative published definition.
pub fn sample_definition() -> FormDefinition {
    let mut field_mappings = BTreeMap::new();
    field_mappings.insert("firstName".to_string(), FieldTypeKey::new("FIRST_NAME"));
    field_mappings.insert("lastName".to_string(), FieldTypeKey::new("LAST_NAME"));
    field_mappings.insert("birthDate".to_string(), FieldTypeKey::new("BIRTH_DATE"));
    field_mappings.insert("email".to_string(), FieldTypeKey::new("EMAIL"));
    field_mappings.insert("patientSignature".to_string(), FieldTypeKey::new("SIGNATURE"));
    FormDefinition {
        id: FormId::new("form-1"),
        name: "New Patient Intake".to_string(),
        category: FormCategory::Anamnesis,
        version: FormVersion::new("1.0.0"),
        status: FormStatus::Published,
        is_active: true,
        is_default: true,
        data_schema: json!({
            "type": "object",
            "required": ["firstName", "lastName", "birthDate"],
            "properties": {
                "firstName": {"type": "string", "minLength": 2, "maxLength": 60},
                "lastName": {"type": "string", "minLength": 2, "maxLength": 60},
                "birthDate": {"type": "string", "format": "date"},
                "email": {"type": "string", "format": "email"},
                "smoker": {"type": "boolean"},
                "bloodType": {
                    "type": "string",
                    "enum": ["a", "b", "ab", "0"],
                    "enumNames": ["A", "B", "AB", "0"]
                },
                "pains": {
                    "type": "array",
                    "items": {
                        "enum": ["head", "back", "joints"],
                        "enumNames": ["Head", "Back", "Joints"]
                    }
                },
                "notes": {"type": "string"},
                "privacyConsent": {"type": "boolean"},
                "patientSignature": {"type": "string", "format": "signature"}
            }
        }),
        layout_schema: json!({
            "ui:order": [
                "firstName", "lastName", "birthDate", "email", "bloodType",
                "smoker", "pains", "notes", "privacyConsent", "patientSignature"
            ],
            "bloodType": {"ui:widget": "radio"},
            "notes": {"ui:widget": "textarea", "ui:placeholder": "Anything else?"}
        }),
        field_mappings,
        created_at: Timestamp::from_unix_millis(1_000),
        published_at: Some(Timestamp::from_unix_millis(2_000)),
        published_by: Some("dr-adams".to_string()),
    }
}

/// Returns a submission snapshot for the sample definition.
pub fn sample_submission(patient_id: &PatientId) -> Submission {
    let mut values = BTreeMap::new();
    values.insert("firstName".to_string(), json!("Jane"));
    values.insert("lastName".to_string(), json!("Doe"));
    values.insert("birthDate".to_string(), json!("1990-05-13"));
    values.insert("email".to_string(), json!("old.address@example.org"));
    values.insert("smoker".to_string(), json!(true));
    values.insert("bloodType".to_string(), json!("ab"));
    values.insert("pains".to_string(), json!(["head", "back"]));
    values.insert("notes".to_string(), json!("Prefers morning appointments."));
    values.insert("privacyConsent".to_string(), json!(true));
    Submission {
        id: SubmissionId::new("sub-1"),
        form_id: FormId::new("form-1"),
        form_version: FormVersion::new("1.0.0"),
        patient_id: patient_id.clone(),
        values,
        language: Language::De,
        submitted_at: Timestamp::from_unix_millis(100_000),
        status: SubmissionStatus::Submitted,
        artifact: None,
        error: None,
    }
}

/// Returns the patient record the sample submission resolves to.
pub fn sample_patient() -> PatientRecord {
    let canonical = formwell_core::CanonicalAttributes {
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        birth_date: Some("1990-05-13".to_string()),
        // The record is authoritative: newer than the snapshot's address.
        email: Some("jane.doe@example.org".to_string()),
        ..formwell_core::CanonicalAttributes::default()
    };
    PatientRecord {
        id: PatientId::new("patient-1"),
        canonical,
        custom: BTreeMap::new(),
        created_at: Timestamp::from_unix_millis(1_000),
    }
}

/// Returns a value map that satisfies the sample schema.
pub fn satisfying_values() -> BTreeMap<String, Value> {
    let mut values = BTreeMap::new();
    values.insert("firstName".to_string(), json!("Jane"));
    values.insert("lastName".to_string(), json!("Doe"));
    values.insert("birthDate".to_string(), json!("1990-05-13"));
    values.insert("email".to_string(), json!("jane.doe@example.org"));
    values.insert("smoker".to_string(), json!(false));
    values.insert("bloodType".to_string(), json!("b"));
    values
}
