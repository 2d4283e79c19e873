// crates/formwell-core/src/runtime/canonicalize.rs
// ============================================================================
// Module: Formwell Submission Canonicalizer
// Description: Maps raw submitted values onto canonical patient attributes.
// Purpose: Persist canonical and custom data without ever losing a field.
// Dependencies: crate::{audit, core, interfaces, runtime::registry}, base64, time
// ============================================================================

//! ## Overview
//! Canonicalization walks the definition's field-mapping table, resolves
//! each mapped schema field to its canonical patient attribute through the
//! field type registry, and copies the submitted value there. Unmapped
//! fields land verbatim in the patient's custom bag, so submissions are
//! never lossy. Patient resolution tries contact email first (newest
//! record wins on duplicates, with a warning), then the
//! (first name, last name, birth date) tuple; stored attributes are
//! overwritten by newer non-blank values. Signature-shaped values are
//! decoded, hashed, and stored as signature records independent of the
//! canonical/custom split.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use thiserror::Error;
use time::Date;
use time::macros::format_description;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::core::CanonicalAttributes;
use crate::core::FieldDataType;
use crate::core::FormDefinition;
use crate::core::Language;
use crate::core::PatientRecord;
use crate::core::SignatureId;
use crate::core::SignatureRecord;
use crate::core::Submission;
use crate::core::SubmissionId;
use crate::core::SubmissionStatus;
use crate::core::Timestamp;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::hash_bytes;
use crate::interfaces::FieldTypeStore;
use crate::interfaces::PatientStore;
use crate::interfaces::SignatureError;
use crate::interfaces::SignatureStore;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::runtime::registry::FieldTypeRegistry;
use crate::runtime::registry::RegistryError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Birth date patterns accepted by canonicalization, tried in order.
pub const ACCEPTED_DATE_PATTERNS: [&str; 4] =
    ["YYYY-MM-DD", "DD.MM.YYYY", "DD/MM/YYYY", "MM/DD/YYYY"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Canonicalization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// A required canonical field is absent or blank.
    #[error("required canonical field missing: {canonical_name}")]
    MissingRequiredField {
        /// Canonical attribute name of the missing field.
        canonical_name: String,
    },
    /// The birth date value matched none of the accepted patterns.
    #[error("unparseable birth date {value:?}; accepted patterns: {}", ACCEPTED_DATE_PATTERNS.join(", "))]
    InvalidBirthDate {
        /// Rejected raw value.
        value: String,
    },
    /// Field type registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Signature store failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of canonicalizing one submission.
#[derive(Debug, Clone)]
pub struct CanonicalizationOutcome {
    /// Stored submission record.
    pub submission: Submission,
    /// True when a new patient record was created.
    pub patient_created: bool,
    /// Schema fields that populated canonical attributes.
    pub canonical_fields: Vec<String>,
    /// Schema fields preserved in the custom bag.
    pub custom_fields: Vec<String>,
    /// Signature records extracted from the submission.
    pub signatures: Vec<SignatureRecord>,
    /// Non-fatal observations (e.g. duplicate email records).
    pub warnings: Vec<String>,
}

// ============================================================================
// SECTION: Canonicalizer
// ============================================================================

/// Submission canonicalizer over the storage interfaces.
pub struct SubmissionCanonicalizer<P, G, S, R, A> {
    /// Patient storage.
    patients: P,
    /// Signature storage.
    signatures: G,
    /// Submission storage.
    submissions: S,
    /// Field type registry resolving mapping keys.
    registry: FieldTypeRegistry<R>,
    /// Audit sink.
    audit: A,
}

impl<P, G, S, R, A> SubmissionCanonicalizer<P, G, S, R, A>
where
    P: PatientStore,
    G: SignatureStore,
    S: SubmissionStore,
    R: FieldTypeStore,
    A: AuditSink,
{
    /// Creates a canonicalizer over the given collaborators.
    #[must_use]
    pub const fn new(
        patients: P,
        signatures: G,
        submissions: S,
        registry: FieldTypeRegistry<R>,
        audit: A,
    ) -> Self {
        Self {
            patients,
            signatures,
            submissions,
            registry,
            audit,
        }
    }

    /// Canonicalizes a validated submission and persists the results.
    ///
    /// The raw value map is stored verbatim as the submission snapshot;
    /// mapped values populate the patient record, unmapped values its
    /// custom bag, and signature payloads the signature store.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError`] when a required canonical field is
    /// missing, the birth date is unparseable, or a collaborator fails.
    pub fn ingest(
        &self,
        definition: &FormDefinition,
        submission_id: SubmissionId,
        values: &BTreeMap<String, Value>,
        language: Language,
        submitted_at: Timestamp,
    ) -> Result<CanonicalizationOutcome, CanonicalizeError> {
        let mut incoming = CanonicalAttributes::default();
        let mut custom: BTreeMap<String, Value> = BTreeMap::new();
        let mut canonical_fields = Vec::new();
        let mut custom_fields = Vec::new();
        let mut pending_signatures: Vec<(String, String, Vec<u8>)> = Vec::new();
        let mut warnings = Vec::new();

        for (raw_name, value) in values {
            let field = raw_name.trim();
            if let Some(text) = value.as_str()
                && let Some((media_type, payload)) = parse_signature_data_url(text)
            {
                match BASE64.decode(payload) {
                    Ok(bytes) => {
                        pending_signatures.push((field.to_string(), media_type, bytes));
                    }
                    Err(err) => {
                        warnings
                            .push(format!("signature payload in {field} failed to decode: {err}"));
                    }
                }
                continue;
            }
            match definition.mapping_for(field) {
                Some(key) => {
                    let field_type = self.registry.require(key)?;
                    if field_type.data_type == FieldDataType::Signature {
                        continue;
                    }
                    canonical_fields.push(field.to_string());
                    let Some(text) = scalar_text(value) else {
                        custom.insert(field_type.canonical_name.clone(), value.clone());
                        continue;
                    };
                    if !incoming.assign(&field_type.canonical_name, text.clone()) {
                        custom.insert(field_type.canonical_name.clone(), Value::String(text));
                    }
                }
                None => {
                    custom_fields.push(field.to_string());
                    custom.insert(field.to_string(), value.clone());
                }
            }
        }

        if let Some(raw) = incoming.birth_date.clone() {
            incoming.birth_date = Some(parse_birth_date(&raw)?);
        }
        require_field(incoming.first_name.as_deref(), "firstName")?;
        require_field(incoming.last_name.as_deref(), "lastName")?;
        require_field(incoming.birth_date.as_deref(), "birthDate")?;

        let (patient, patient_created) =
            self.resolve_patient(&incoming, &custom, submitted_at, &mut warnings)?;

        let signer_name = format!(
            "{} {}",
            patient.canonical.first_name.as_deref().unwrap_or_default(),
            patient.canonical.last_name.as_deref().unwrap_or_default()
        );
        let mut signatures = Vec::with_capacity(pending_signatures.len());
        for (field, media_type, bytes) in pending_signatures {
            let record = SignatureRecord {
                id: SignatureId::new(format!("{}-{field}", submission_id.as_str())),
                patient_id: patient.id.clone(),
                submission_id: submission_id.clone(),
                signer_name: signer_name.trim().to_string(),
                media_type,
                content_hash: hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes),
                captured_at: submitted_at,
            };
            self.signatures.store(&record, &bytes)?;
            signatures.push(record);
        }

        let submission = Submission {
            id: submission_id.clone(),
            form_id: definition.id.clone(),
            form_version: definition.version.clone(),
            patient_id: patient.id.clone(),
            values: values.clone(),
            language,
            submitted_at,
            status: SubmissionStatus::Submitted,
            artifact: None,
            error: None,
        };
        self.submissions.insert(&submission)?;

        self.audit.record(&AuditEvent::SubmissionCanonicalized {
            submission_id,
            patient_id: patient.id.clone(),
            patient_created,
            signatures: signatures.len(),
        });

        Ok(CanonicalizationOutcome {
            submission,
            patient_created,
            canonical_fields,
            custom_fields,
            signatures,
            warnings,
        })
    }

    /// Resolves the target patient record, creating one when necessary.
    ///
    /// Lookup order is contact email, then the identity tuple. Stored
    /// attributes are overwritten by non-blank incoming values (latest
    /// submission wins); custom bag entries merge per key.
    fn resolve_patient(
        &self,
        incoming: &CanonicalAttributes,
        custom: &BTreeMap<String, Value>,
        submitted_at: Timestamp,
        warnings: &mut Vec<String>,
    ) -> Result<(PatientRecord, bool), CanonicalizeError> {
        let mut matches = Vec::new();
        if let Some(email) = incoming.email.as_deref()
            && !email.trim().is_empty()
        {
            matches = self.patients.find_by_email(email)?;
            if matches.len() > 1 {
                warnings.push(format!(
                    "{} patient records share email {email}; using the most recently created",
                    matches.len()
                ));
            }
        }
        if matches.is_empty()
            && let (Some(first), Some(last), Some(birth)) = (
                incoming.first_name.as_deref(),
                incoming.last_name.as_deref(),
                incoming.birth_date.as_deref(),
            )
        {
            matches = self.patients.find_by_identity(first, last, birth)?;
        }

        if let Some(mut existing) =
            matches.into_iter().max_by_key(|record| record.created_at)
        {
            existing.canonical.merge_non_blank(incoming);
            for (name, value) in custom {
                existing.custom.insert(name.clone(), value.clone());
            }
            self.patients.update(&existing)?;
            return Ok((existing, false));
        }

        let record = PatientRecord {
            id: self.patients.allocate_id()?,
            canonical: incoming.clone(),
            custom: custom.clone(),
            created_at: submitted_at,
        };
        self.patients.insert(&record)?;
        Ok((record, true))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails with a descriptive error when a required canonical field is blank.
fn require_field(value: Option<&str>, canonical_name: &str) -> Result<(), CanonicalizeError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(CanonicalizeError::MissingRequiredField {
            canonical_name: canonical_name.to_string(),
        }),
    }
}

/// Parses a birth date against the accepted patterns, in order.
///
/// Returns the canonical ISO form on success.
fn parse_birth_date(raw: &str) -> Result<String, CanonicalizeError> {
    let trimmed = raw.trim();
    let iso = format_description!("[year]-[month]-[day]");
    let dotted = format_description!("[day].[month].[year]");
    let slashed_dmy = format_description!("[day]/[month]/[year]");
    let slashed_mdy = format_description!("[month]/[day]/[year]");
    let parsed = Date::parse(trimmed, iso)
        .or_else(|_| Date::parse(trimmed, dotted))
        .or_else(|_| Date::parse(trimmed, slashed_dmy))
        .or_else(|_| Date::parse(trimmed, slashed_mdy));
    match parsed {
        Ok(date) => date.format(iso).map_err(|_| CanonicalizeError::InvalidBirthDate {
            value: raw.to_string(),
        }),
        Err(_) => Err(CanonicalizeError::InvalidBirthDate {
            value: raw.to_string(),
        }),
    }
}

/// Renders a scalar submitted value as attribute text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Splits a `data:<media>;base64,<payload>` URL into media type and payload.
fn parse_signature_data_url(text: &str) -> Option<(String, &str)> {
    let rest = text.strip_prefix("data:image/")?;
    let (subtype, payload) = rest.split_once(";base64,")?;
    Some((format!("image/{subtype}"), payload))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::parse_birth_date;
    use super::parse_signature_data_url;

    /// Verifies every accepted pattern normalizes to ISO form.
    #[test]
    fn birth_date_patterns_normalize_to_iso() {
        for raw in ["1990-05-13", "13.05.1990", "13/05/1990", "05/13/1990"] {
            let parsed = parse_birth_date(raw);
            assert_eq!(parsed.ok().as_deref(), Some("1990-05-13"), "pattern {raw}");
        }
    }

    /// Verifies nonsense dates are rejected with the pattern list.
    #[test]
    fn unparseable_birth_date_is_rejected() {
        let err = parse_birth_date("next tuesday").map(|_| ()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("YYYY-MM-DD"), "message: {message}");
    }

    /// Verifies the data-URL splitter extracts media type and payload.
    #[test]
    fn signature_data_url_is_split() {
        let parsed = parse_signature_data_url("data:image/png;base64,AAAA");
        assert_eq!(parsed, Some(("image/png".to_string(), "AAAA")));
        assert_eq!(parse_signature_data_url("hello"), None);
    }
}
