// crates/formwell-render/src/document.rs
// ============================================================================
// Module: Formwell Document Renderer
// Description: Category-grouped, localized document rendering for submissions.
// Purpose: Produce the durable document artifact with signature embedding.
// Dependencies: formwell-core
// ============================================================================

//! ## Overview
//! The document renderer turns a completed submission into the durable,
//! human-readable artifact: fields are ordered by the layout schema,
//! formatted by declared type, grouped by field type category, and
//! localized into the submission language. Canonical patient attributes
//! are merged over the raw snapshot for recognizable identity fields, so
//! the patient record stays authoritative even when the snapshot is
//! stale. Signatures captured close to the submission are attached with
//! their metadata. The assembled markup goes to the external rasterizer;
//! the resulting bytes are hashed and persisted, and the submission
//! advances to Completed. A failure records Failed instead; no partially
//! written artifact survives.

// ============================================================================
// SECTION: Imports
// ============================================================================

use formwell_core::ArtifactInfo;
use formwell_core::AuditEvent;
use formwell_core::AuditSink;
use formwell_core::CATEGORY_ORDER;
use formwell_core::ChoiceOption;
use formwell_core::ChoiceWidget;
use formwell_core::FieldCategory;
use formwell_core::FieldKind;
use formwell_core::FieldSpec;
use formwell_core::FieldTypeRegistry;
use formwell_core::FieldTypeStore;
use formwell_core::FormDefinition;
use formwell_core::HashDigest;
use formwell_core::Language;
use formwell_core::PatientRecord;
use formwell_core::RasterizeError;
use formwell_core::Rasterizer;
use formwell_core::RegistryError;
use formwell_core::SchemaError;
use formwell_core::SignatureError;
use formwell_core::SignatureRecord;
use formwell_core::SignatureStore;
use formwell_core::StoreError;
use formwell_core::Submission;
use formwell_core::SubmissionStatus;
use formwell_core::SubmissionStore;
use formwell_core::TranslationBundle;
use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::hash_bytes;
use formwell_core::parse_data_schema;
use formwell_core::parse_layout_schema;
use serde_json::Value;
use thiserror::Error;

use crate::format::format_boolean;
use crate::format::format_date;
use crate::format::format_dropdown_choice;
use crate::format::format_multi_choice;
use crate::format::format_radio_choice;
use crate::format::format_timestamp;
use crate::labels::resolve_label;
use crate::labels::resolve_option_label;
use crate::markup::escape_html;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Window around the submission timestamp inside which signatures attach.
pub const SIGNATURE_WINDOW_MILLIS: i64 = 10 * 60 * 1_000;

/// Consent-related name tokens across the supported languages.
///
/// Fields whose names contain one of these tokens are skipped by the
/// document body; consent is represented by the signature section.
const CONSENT_TOKENS: &[&str] = &[
    "consent",
    "gdpr",
    "privacy",
    "datenschutz",
    "einwilligung",
    "zustimmung",
    "consentement",
    "confidentialite",
    "consenso",
    "privacidad",
    "consentimiento",
    "onay",
    "gizlilik",
    "zgoda",
    "согласие",
    "موافقة",
];

/// Inline stylesheet for rendered documents.
const DOCUMENT_STYLE: &str = "body{font-family:serif;margin:2rem;color:#111}\n\
h1{font-size:1.4rem;border-bottom:2px solid #111;padding-bottom:.3rem}\n\
h2{font-size:1.1rem;margin-top:1.2rem}\n\
table{width:100%;border-collapse:collapse}\n\
th{text-align:left;width:40%;padding:.2rem .4rem;vertical-align:top}\n\
td{padding:.2rem .4rem}\n\
.meta{color:#444}\n\
.signature{margin-top:.6rem}\n\
.signature code{font-size:.75rem;color:#555}\n";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Document rendering errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A returned error leaves the submission in Failed, never Completed.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The definition's data schema failed shape conversion.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Field type registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Signature store failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The rasterizer rejected the markup.
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
}

// ============================================================================
// SECTION: Rendered Document
// ============================================================================

/// A produced document artifact with its tamper evidence.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Updated submission record (status Completed).
    pub submission: Submission,
    /// Rasterized artifact bytes.
    pub bytes: Vec<u8>,
    /// Content hash of the artifact bytes.
    pub content_hash: HashDigest,
}

// ============================================================================
// SECTION: Document Renderer
// ============================================================================

/// Document renderer over the rasterizer and storage interfaces.
pub struct DocumentRenderer<Z, G, S, R, A> {
    /// Markup-to-document rasterizer.
    rasterizer: Z,
    /// Signature storage.
    signatures: G,
    /// Submission storage.
    submissions: S,
    /// Field type registry used for category grouping.
    registry: FieldTypeRegistry<R>,
    /// Audit sink.
    audit: A,
}

impl<Z, G, S, R, A> DocumentRenderer<Z, G, S, R, A>
where
    Z: Rasterizer,
    G: SignatureStore,
    S: SubmissionStore,
    R: FieldTypeStore,
    A: AuditSink,
{
    /// Creates a document renderer over the given collaborators.
    #[must_use]
    pub const fn new(
        rasterizer: Z,
        signatures: G,
        submissions: S,
        registry: FieldTypeRegistry<R>,
        audit: A,
    ) -> Self {
        Self {
            rasterizer,
            signatures,
            submissions,
            registry,
            audit,
        }
    }

    /// Produces the document artifact for a submission.
    ///
    /// On success the submission is persisted as Completed with the
    /// artifact location and content hash. On failure the submission is
    /// persisted as Failed with the error recorded, and the error is
    /// returned; no partially written artifact remains.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when markup assembly, rasterizing, or
    /// persistence fails.
    pub fn render(
        &self,
        definition: &FormDefinition,
        submission: &Submission,
        patient: &PatientRecord,
        bundle: Option<&TranslationBundle>,
        artifact_location: &str,
    ) -> Result<RenderedDocument, DocumentError> {
        match self.produce(definition, submission, patient, bundle) {
            Ok(bytes) => {
                let content_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
                let mut completed = submission.clone();
                completed.artifact = Some(ArtifactInfo {
                    location: artifact_location.to_string(),
                    content_hash: content_hash.clone(),
                });
                completed.status = SubmissionStatus::Completed;
                completed.error = None;
                self.submissions.update(&completed)?;
                self.audit.record(&AuditEvent::SubmissionCompleted {
                    submission_id: completed.id.clone(),
                    language: completed.language,
                    content_hash: content_hash.clone(),
                });
                Ok(RenderedDocument {
                    submission: completed,
                    bytes,
                    content_hash,
                })
            }
            Err(err) => {
                let mut failed = submission.clone();
                failed.status = SubmissionStatus::Failed;
                failed.error = Some(err.to_string());
                let _ = self.submissions.update(&failed);
                self.audit.record(&AuditEvent::SubmissionFailed {
                    submission_id: submission.id.clone(),
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Assembles the markup and hands it to the rasterizer.
    fn produce(
        &self,
        definition: &FormDefinition,
        submission: &Submission,
        patient: &PatientRecord,
        bundle: Option<&TranslationBundle>,
    ) -> Result<Vec<u8>, DocumentError> {
        let markup = self.build_markup(definition, submission, patient, bundle)?;
        Ok(self.rasterizer.rasterize(&markup)?)
    }

    /// Builds the category-grouped document markup.
    fn build_markup(
        &self,
        definition: &FormDefinition,
        submission: &Submission,
        patient: &PatientRecord,
        bundle: Option<&TranslationBundle>,
    ) -> Result<String, DocumentError> {
        let language = submission.language;
        let layout = parse_layout_schema(&definition.layout_schema);
        let fields = parse_data_schema(&definition.data_schema, &layout)?;

        let mut groups: Vec<(FieldCategory, Vec<(String, String)>)> =
            CATEGORY_ORDER.iter().map(|category| (*category, Vec::new())).collect();
        for field in &fields {
            if matches!(field.kind, FieldKind::Signature) || is_consent_field(&field.name) {
                continue;
            }
            let Some(value) = merged_value(field, submission, patient) else {
                continue;
            };
            let Some(formatted) = format_value(field, &value, language, bundle) else {
                continue;
            };
            let category = self.category_for(definition, &field.name)?;
            let label = resolve_label(field, bundle);
            if let Some(group) = groups.iter_mut().find(|(entry, _)| *entry == category) {
                group.1.push((label, formatted));
            }
        }

        let signatures = self.signatures.list_in_window(
            &patient.id,
            submission.submitted_at,
            SIGNATURE_WINDOW_MILLIS,
        )?;

        Ok(assemble_document(definition, submission, patient, bundle, &groups, &signatures))
    }

    /// Resolves the grouping category for a schema field.
    ///
    /// Unmapped fields fall into the catch-all Custom category.
    fn category_for(
        &self,
        definition: &FormDefinition,
        field: &str,
    ) -> Result<FieldCategory, DocumentError> {
        match definition.mapping_for(field) {
            Some(key) => Ok(self.registry.require(key)?.category),
            None => Ok(FieldCategory::Custom),
        }
    }
}

// ============================================================================
// SECTION: Value Merging
// ============================================================================

/// Returns the display value for a field, merging canonical attributes
/// over the raw snapshot.
///
/// The patient record is authoritative for identity fields recognizable
/// under common name variants; all other fields read the snapshot.
fn merged_value(field: &FieldSpec, submission: &Submission, patient: &PatientRecord) -> Option<Value> {
    if let Some(canonical_name) = canonical_attribute_for(&field.name)
        && let Some(stored) = patient.canonical.attribute(canonical_name)
        && !stored.trim().is_empty()
    {
        return Some(Value::String(stored.to_string()));
    }
    submission.values.get(&field.name).cloned()
}

/// Maps a schema field name onto a canonical attribute via name variants.
///
/// Matching is case-insensitive with separators stripped, covering the
/// common synonyms per attribute.
fn canonical_attribute_for(field: &str) -> Option<&'static str> {
    let mut normalized = field.to_lowercase();
    normalized.retain(|ch| ch != '_' && ch != '-' && ch != ' ');
    match normalized.as_str() {
        "firstname" | "givenname" | "vorname" => Some("firstName"),
        "lastname" | "surname" | "familyname" | "nachname" => Some("lastName"),
        "birthdate" | "dateofbirth" | "dob" | "geburtsdatum" => Some("birthDate"),
        "email" | "emailaddress" | "mail" => Some("email"),
        "phone" | "phonenumber" | "tel" | "telefon" | "mobile" => Some("phone"),
        "street" | "address" | "strasse" | "straße" => Some("street"),
        "postalcode" | "zip" | "zipcode" | "plz" => Some("postalCode"),
        "city" | "town" | "ort" | "stadt" => Some("city"),
        "insurance" | "insuranceprovider" | "krankenkasse" => Some("insuranceProvider"),
        "insurancenumber" | "membernumber" | "versichertennummer" => Some("insuranceNumber"),
        "gender" | "sex" | "geschlecht" => Some("gender"),
        _ => None,
    }
}

/// Returns true when a field name contains a consent-related token.
fn is_consent_field(field: &str) -> bool {
    let lowered = field.to_lowercase();
    CONSENT_TOKENS.iter().any(|token| lowered.contains(token))
}

// ============================================================================
// SECTION: Value Formatting
// ============================================================================

/// Formats one value by its declared field kind.
///
/// Returns `None` for blank values, which are omitted from the document.
fn format_value(
    field: &FieldSpec,
    value: &Value,
    language: Language,
    bundle: Option<&TranslationBundle>,
) -> Option<String> {
    match &field.kind {
        FieldKind::Boolean => {
            let flag = match value {
                Value::Bool(flag) => *flag,
                Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
                _ => return None,
            };
            Some(format_boolean(flag, language))
        }
        FieldKind::Date => {
            let text = value.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            Some(format_date(text, language))
        }
        FieldKind::Choice {
            options,
            widget,
        } => {
            let chosen = scalar_display(value)?;
            let translated = translated_options(&field.name, options, bundle);
            match widget {
                ChoiceWidget::Radio => {
                    let marked: Vec<(String, bool)> = translated
                        .iter()
                        .map(|option| (option.label.clone(), option.value == chosen))
                        .collect();
                    Some(format_radio_choice(&marked))
                }
                ChoiceWidget::Dropdown => Some(format_dropdown_choice(&translated, &chosen)),
            }
        }
        FieldKind::MultiChoice {
            options,
        } => {
            let chosen = value.as_array()?;
            let translated = translated_options(&field.name, options, bundle);
            let labels: Vec<String> = chosen
                .iter()
                .filter_map(scalar_display)
                .map(|value| {
                    translated
                        .iter()
                        .find(|option| option.value == value)
                        .map_or(value, |option| option.label.clone())
                })
                .collect();
            if labels.is_empty() {
                return None;
            }
            Some(format_multi_choice(&labels))
        }
        _ => {
            let text = scalar_display(value)?;
            if text.trim().is_empty() {
                return None;
            }
            Some(text)
        }
    }
}

/// Resolves translated display labels for every option of a field.
fn translated_options(
    field_name: &str,
    options: &[ChoiceOption],
    bundle: Option<&TranslationBundle>,
) -> Vec<ChoiceOption> {
    options
        .iter()
        .map(|option| ChoiceOption {
            value: option.value.clone(),
            label: resolve_option_label(field_name, &option.value, &option.label, bundle),
        })
        .collect()
}

/// Renders a scalar JSON value as display text.
fn scalar_display(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Document Assembly
// ============================================================================

/// Returns the localized heading for a category section.
fn category_heading(
    category: FieldCategory,
    bundle: Option<&TranslationBundle>,
) -> String {
    let key = format!("category.{}", category.as_str());
    if let Some(heading) = bundle.and_then(|bundle| bundle.messages.get(&key)) {
        return heading.clone();
    }
    match category {
        FieldCategory::Personal => "Personal Information".to_string(),
        FieldCategory::Contact => "Contact".to_string(),
        FieldCategory::Insurance => "Insurance".to_string(),
        FieldCategory::Medical => "Medical History".to_string(),
        FieldCategory::Consent => "Consent".to_string(),
        FieldCategory::Custom => "Additional Information".to_string(),
    }
}

/// Assembles the full document markup from the grouped fields.
fn assemble_document(
    definition: &FormDefinition,
    submission: &Submission,
    patient: &PatientRecord,
    bundle: Option<&TranslationBundle>,
    groups: &[(FieldCategory, Vec<(String, String)>)],
    signatures: &[SignatureRecord],
) -> String {
    let language = submission.language;
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!(
        "<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\"/>\n<title>{}</title>\n",
        language.as_tag(),
        language.direction().html_dir(),
        escape_html(&definition.name)
    ));
    out.push_str("<style>\n");
    out.push_str(DOCUMENT_STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&definition.name)));
    let patient_name = format!(
        "{} {}",
        patient.canonical.first_name.as_deref().unwrap_or_default(),
        patient.canonical.last_name.as_deref().unwrap_or_default()
    );
    out.push_str(&format!(
        "<p class=\"meta\">{} &mdash; {}</p>\n",
        escape_html(patient_name.trim()),
        escape_html(&format_timestamp(submission.submitted_at))
    ));

    for (category, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        out.push_str("<section>\n");
        out.push_str(&format!(
            "<h2>{}</h2>\n<table>\n",
            escape_html(&category_heading(*category, bundle))
        ));
        for (label, value) in entries {
            out.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>\n",
                escape_html(label),
                escape_html(value)
            ));
        }
        out.push_str("</table>\n</section>\n");
    }

    if !signatures.is_empty() {
        let heading = bundle
            .and_then(|bundle| bundle.messages.get("signatures"))
            .map_or("Signatures", String::as_str);
        out.push_str(&format!("<section class=\"signatures\">\n<h2>{}</h2>\n", escape_html(heading)));
        for signature in signatures {
            out.push_str(&format!(
                "<div class=\"signature\"><strong>{}</strong> &mdash; {}<br/><code>{}</code></div>\n",
                escape_html(&signature.signer_name),
                escape_html(&format_timestamp(signature.captured_at)),
                escape_html(&signature.content_hash.value)
            ));
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
