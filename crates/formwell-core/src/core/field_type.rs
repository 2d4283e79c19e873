// crates/formwell-core/src/core/field_type.rs
// ============================================================================
// Module: Formwell Field Types
// Description: Reusable field identities mapped onto patient attributes.
// Purpose: Define the registry entry model and the seeded system catalog.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A field type is a reusable identity such as "first name": a machine key,
//! the canonical attribute it populates on the patient record, a UI
//! category used for document grouping, and a data type. System entries are
//! seeded and immutable; operators may add custom entries for clinic
//! specific fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FieldTypeKey;

// ============================================================================
// SECTION: Field Category
// ============================================================================

/// UI category of a field type, used for grouping in rendered documents.
///
/// # Invariants
/// - Variants are stable for serialization and document grouping order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Personal identity fields (name, birth date, gender).
    Personal,
    /// Contact fields (email, phone, address).
    Contact,
    /// Insurance fields (provider, member number).
    Insurance,
    /// Medical history and anamnesis fields.
    Medical,
    /// Consent and privacy acknowledgement fields.
    Consent,
    /// Operator-defined fields without a canonical home.
    Custom,
}

/// Fixed category order used when grouping document sections.
pub const CATEGORY_ORDER: [FieldCategory; 6] = [
    FieldCategory::Personal,
    FieldCategory::Contact,
    FieldCategory::Insurance,
    FieldCategory::Medical,
    FieldCategory::Consent,
    FieldCategory::Custom,
];

impl FieldCategory {
    /// Returns a stable label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Contact => "contact",
            Self::Insurance => "insurance",
            Self::Medical => "medical",
            Self::Consent => "consent",
            Self::Custom => "custom",
        }
    }
}

// ============================================================================
// SECTION: Field Data Type
// ============================================================================

/// Data type carried by a field type.
///
/// # Invariants
/// - Variants are stable for serialization and canonicalization dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDataType {
    /// Short free text.
    String,
    /// Multi-line free text.
    LongText,
    /// Calendar date.
    Date,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Numeric value.
    Number,
    /// Boolean toggle.
    Boolean,
    /// Drawn signature payload.
    Signature,
}

// ============================================================================
// SECTION: Field Type Entry
// ============================================================================

/// Registry entry describing one reusable field identity.
///
/// # Invariants
/// - `key` and `canonical_name` are each globally unique in the registry.
/// - `system` entries are seeded and cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    /// Unique machine key (e.g. `FIRST_NAME`).
    pub key: FieldTypeKey,
    /// Canonical attribute name on the patient record (e.g. `firstName`).
    pub canonical_name: String,
    /// Translation key for operator-facing labels.
    pub label_key: String,
    /// UI category used for document grouping.
    pub category: FieldCategory,
    /// Data type of values carried by this field.
    pub data_type: FieldDataType,
    /// True when every published form must map this field type.
    pub required: bool,
    /// True for seeded, non-deletable entries.
    pub system: bool,
    /// Accepted name aliases for fuzzy lookup (compared case-insensitively).
    pub aliases: Vec<String>,
}

impl FieldType {
    /// Returns true when any alias matches `name` case-insensitively.
    #[must_use]
    pub fn matches_alias(&self, name: &str) -> bool {
        let lowered = name.trim().to_ascii_lowercase();
        self.aliases.iter().any(|alias| alias.to_ascii_lowercase() == lowered)
    }
}

// ============================================================================
// SECTION: System Catalog
// ============================================================================

/// Builds one seeded system field type.
fn system_entry(
    key: &str,
    canonical_name: &str,
    category: FieldCategory,
    data_type: FieldDataType,
    required: bool,
    aliases: &[&str],
) -> FieldType {
    FieldType {
        key: FieldTypeKey::new(key),
        canonical_name: canonical_name.to_string(),
        label_key: format!("fieldtype.{}", key.to_ascii_lowercase()),
        category,
        data_type,
        required,
        system: true,
        aliases: aliases.iter().map(ToString::to_string).collect(),
    }
}

/// Returns the seeded system catalog of field types.
///
/// The catalog covers the canonical patient attributes plus the signature
/// capture field. Seeding is idempotent at the registry level.
#[must_use]
pub fn system_catalog() -> Vec<FieldType> {
    vec![
        system_entry(
            "FIRST_NAME",
            "firstName",
            FieldCategory::Personal,
            FieldDataType::String,
            true,
            &["firstname", "first_name", "givenname", "given_name", "vorname"],
        ),
        system_entry(
            "LAST_NAME",
            "lastName",
            FieldCategory::Personal,
            FieldDataType::String,
            true,
            &["lastname", "last_name", "surname", "familyname", "family_name", "nachname"],
        ),
        system_entry(
            "BIRTH_DATE",
            "birthDate",
            FieldCategory::Personal,
            FieldDataType::Date,
            true,
            &["birthdate", "birth_date", "dateofbirth", "date_of_birth", "dob", "geburtsdatum"],
        ),
        system_entry(
            "GENDER",
            "gender",
            FieldCategory::Personal,
            FieldDataType::String,
            false,
            &["gender", "sex", "geschlecht"],
        ),
        system_entry(
            "EMAIL",
            "email",
            FieldCategory::Contact,
            FieldDataType::Email,
            false,
            &["email", "e_mail", "emailaddress", "email_address", "mail"],
        ),
        system_entry(
            "PHONE",
            "phone",
            FieldCategory::Contact,
            FieldDataType::Phone,
            false,
            &["phone", "phonenumber", "phone_number", "tel", "telefon", "mobile"],
        ),
        system_entry(
            "STREET",
            "street",
            FieldCategory::Contact,
            FieldDataType::String,
            false,
            &["street", "address", "strasse", "straße", "address_line"],
        ),
        system_entry(
            "POSTAL_CODE",
            "postalCode",
            FieldCategory::Contact,
            FieldDataType::String,
            false,
            &["postalcode", "postal_code", "zip", "zipcode", "plz"],
        ),
        system_entry(
            "CITY",
            "city",
            FieldCategory::Contact,
            FieldDataType::String,
            false,
            &["city", "town", "ort", "stadt"],
        ),
        system_entry(
            "INSURANCE_PROVIDER",
            "insuranceProvider",
            FieldCategory::Insurance,
            FieldDataType::String,
            false,
            &["insurance", "insuranceprovider", "insurance_provider", "krankenkasse"],
        ),
        system_entry(
            "INSURANCE_NUMBER",
            "insuranceNumber",
            FieldCategory::Insurance,
            FieldDataType::String,
            false,
            &["insurancenumber", "insurance_number", "membernumber", "versichertennummer"],
        ),
        system_entry(
            "SIGNATURE",
            "signature",
            FieldCategory::Consent,
            FieldDataType::Signature,
            false,
            &["signature", "unterschrift", "sign"],
        ),
    ]
}
