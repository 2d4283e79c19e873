// crates/formwell-core/src/core/patient.rs
// ============================================================================
// Module: Formwell Patient Records
// Description: Canonical patient attributes plus an open custom-field bag.
// Purpose: Keep known attributes statically typed without losing unknowns.
// Dependencies: crate::core::{hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Canonicalized submissions populate a fixed set of patient attributes;
//! everything the operator did not map lands verbatim in an open custom
//! bag, so submissions are never lossy. The attribute set mirrors the
//! canonical names of the seeded system field types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::PatientId;
use crate::core::identifiers::SignatureId;
use crate::core::identifiers::SubmissionId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Canonical Attributes
// ============================================================================

/// Fixed canonical attributes of a patient record.
///
/// # Invariants
/// - `birth_date` is canonical ISO form (`YYYY-MM-DD`) once set.
/// - Blank incoming values never overwrite stored ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanonicalAttributes {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Birth date in canonical ISO form.
    pub birth_date: Option<String>,
    /// Gender self-description.
    pub gender: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Street address line.
    pub street: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Insurance provider name.
    pub insurance_provider: Option<String>,
    /// Insurance member number.
    pub insurance_number: Option<String>,
}

impl CanonicalAttributes {
    /// Assigns a value under its canonical attribute name.
    ///
    /// Returns false when the name is not a canonical attribute; callers
    /// then route the value into the custom bag instead.
    pub fn assign(&mut self, canonical_name: &str, text: String) -> bool {
        let slot = match canonical_name {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "birthDate" => &mut self.birth_date,
            "gender" => &mut self.gender,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "street" => &mut self.street,
            "postalCode" => &mut self.postal_code,
            "city" => &mut self.city,
            "insuranceProvider" => &mut self.insurance_provider,
            "insuranceNumber" => &mut self.insurance_number,
            _ => return false,
        };
        *slot = Some(text);
        true
    }

    /// Reads a value by its canonical attribute name.
    #[must_use]
    pub fn attribute(&self, canonical_name: &str) -> Option<&str> {
        let slot = match canonical_name {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "birthDate" => &self.birth_date,
            "gender" => &self.gender,
            "email" => &self.email,
            "phone" => &self.phone,
            "street" => &self.street,
            "postalCode" => &self.postal_code,
            "city" => &self.city,
            "insuranceProvider" => &self.insurance_provider,
            "insuranceNumber" => &self.insurance_number,
            _ => return None,
        };
        slot.as_deref()
    }

    /// Overwrites stored attributes with non-blank incoming values.
    ///
    /// Latest submission wins: a non-blank incoming value replaces the
    /// stored one; blank or absent incoming values leave it untouched.
    pub fn merge_non_blank(&mut self, incoming: &Self) {
        merge_slot(&mut self.first_name, &incoming.first_name);
        merge_slot(&mut self.last_name, &incoming.last_name);
        merge_slot(&mut self.birth_date, &incoming.birth_date);
        merge_slot(&mut self.gender, &incoming.gender);
        merge_slot(&mut self.email, &incoming.email);
        merge_slot(&mut self.phone, &incoming.phone);
        merge_slot(&mut self.street, &incoming.street);
        merge_slot(&mut self.postal_code, &incoming.postal_code);
        merge_slot(&mut self.city, &incoming.city);
        merge_slot(&mut self.insurance_provider, &incoming.insurance_provider);
        merge_slot(&mut self.insurance_number, &incoming.insurance_number);
    }
}

/// Applies the non-blank-overwrite rule to one attribute slot.
fn merge_slot(stored: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming
        && !value.trim().is_empty()
    {
        *stored = Some(value.clone());
    }
}

// ============================================================================
// SECTION: Patient Record
// ============================================================================

/// Patient record populated by submission canonicalization.
///
/// # Invariants
/// - `custom` preserves unmapped submitted fields verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Patient identifier.
    pub id: PatientId,
    /// Fixed canonical attributes.
    pub canonical: CanonicalAttributes,
    /// Open bag of unmapped submitted fields.
    pub custom: BTreeMap<String, Value>,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Signature Record
// ============================================================================

/// Metadata of one captured signature.
///
/// # Invariants
/// - `content_hash` matches the decoded signature bytes held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Signature identifier.
    pub id: SignatureId,
    /// Owning patient.
    pub patient_id: PatientId,
    /// Submission the signature arrived with.
    pub submission_id: SubmissionId,
    /// Signer display name.
    pub signer_name: String,
    /// Media type of the decoded payload (e.g. `image/png`).
    pub media_type: String,
    /// Content hash of the decoded payload.
    pub content_hash: HashDigest,
    /// Capture timestamp.
    pub captured_at: Timestamp,
}
