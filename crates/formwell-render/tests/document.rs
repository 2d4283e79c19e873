// crates/formwell-render/tests/document.rs
// ============================================================================
// Module: Document Renderer Tests
// Description: Tests for category-grouped, localized document rendering.
// Purpose: Validate formatting, grouping, merging, signatures, and status.
// Dependencies: formwell-core, formwell-render, serde_json
// ============================================================================
//! ## Overview
//! Ensures documents group fields by field type category, format values by
//! declared type in the submission language, merge canonical patient
//! attributes over stale snapshots, skip consent and signature fields,
//! attach temporally close signatures, and advance the submission to
//! Completed (or Failed) with the artifact hash persisted.

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

use common::EchoRasterizer;
use common::FailingRasterizer;
use common::sample_definition;
use common::sample_patient;
use common::sample_submission;
use formwell_core::FieldTypeRegistry;
use formwell_core::InMemoryFieldTypeStore;
use formwell_core::InMemorySignatureStore;
use formwell_core::InMemorySubmissionStore;
use formwell_core::NoopAuditSink;
use formwell_core::Rasterizer;
use formwell_core::SignatureId;
use formwell_core::SignatureRecord;
use formwell_core::SignatureStore;
use formwell_core::SubmissionStatus;
use formwell_core::SubmissionStore;
use formwell_core::Timestamp;
use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::hash_bytes;
use formwell_render::DocumentRenderer;
use formwell_render::SIGNATURE_WINDOW_MILLIS;

/// Fully wired document renderer for tests.
type TestRenderer<Z> = DocumentRenderer<
    Z,
    InMemorySignatureStore,
    InMemorySubmissionStore,
    InMemoryFieldTypeStore,
    NoopAuditSink,
>;

fn renderer<Z: Rasterizer>(
    rasterizer: Z,
) -> (TestRenderer<Z>, InMemorySignatureStore, InMemorySubmissionStore) {
    let field_types = InMemoryFieldTypeStore::new();
    let registry = FieldTypeRegistry::new(field_types.clone());
    registry.seed_system_catalog().expect("seed catalog");
    let signatures = InMemorySignatureStore::new();
    let submissions = InMemorySubmissionStore::new();
    let renderer = DocumentRenderer::new(
        rasterizer,
        signatures.clone(),
        submissions.clone(),
        FieldTypeRegistry::new(field_types),
        NoopAuditSink,
    );
    (renderer, signatures, submissions)
}

fn signature_at(offset_millis: i64, id: &str) -> SignatureRecord {
    SignatureRecord {
        id: SignatureId::new(id),
        patient_id: sample_patient().id,
        submission_id: sample_submission(&sample_patient().id).id,
        signer_name: "Jane Doe".to_string(),
        media_type: "image/png".to_string(),
        content_hash: hash_bytes(DEFAULT_HASH_ALGORITHM, b"signature"),
        captured_at: Timestamp::from_unix_millis(100_000 + offset_millis),
    }
}

/// Verifies the happy path: grouped markup, hash, and Completed status.
#[test]
fn document_completes_submission_with_hash() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();

    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();

    assert_eq!(rendered.submission.status, SubmissionStatus::Completed);
    let artifact = rendered.submission.artifact.unwrap();
    assert_eq!(artifact.location, "artifacts/sub-1.pdf");
    assert_eq!(artifact.content_hash, hash_bytes(DEFAULT_HASH_ALGORITHM, &rendered.bytes));

    // The persisted record matches the returned one.
    let stored = submissions.get(&submission.id).unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Completed);

    let markup = String::from_utf8(rendered.bytes).unwrap();
    // Category grouping: identity fields under Personal, email under Contact.
    assert!(markup.contains("Personal Information"));
    assert!(markup.contains("Contact"));
    // Unmapped fields fall into the catch-all category.
    assert!(markup.contains("Additional Information"));
    assert!(markup.contains("Prefers morning appointments."));
}

/// Verifies the German boolean marker rows from the engine contract.
#[test]
fn german_boolean_renders_two_option_marker() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(markup.contains("(X) Ja   ( ) Nein"), "markup: {markup}");
}

/// Verifies dates render in the locale pattern of the language.
#[test]
fn dates_render_in_locale_pattern() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(markup.contains("13.05.1990"));
}

/// Verifies radio choices list every option with the selection marked.
#[test]
fn radio_choice_marks_selected_option() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(markup.contains("( ) A   ( ) B   (X) AB   ( ) 0"), "markup: {markup}");
}

/// Verifies multi-choice values render as a marked list.
#[test]
fn multi_choice_renders_marked_list() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(markup.contains("[X] Head, [X] Back"));
}

/// Verifies canonical attributes override a stale snapshot value.
#[test]
fn canonical_attributes_override_snapshot() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    // The patient record's email wins over the stale snapshot value.
    assert!(markup.contains("jane.doe@example.org"));
    assert!(!markup.contains("old.address@example.org"));
}

/// Verifies consent-named and signature fields are skipped in the body.
#[test]
fn consent_and_signature_fields_are_skipped() {
    let (renderer, _, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();
    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(!markup.contains("Privacy Consent"));
    assert!(!markup.contains("Patient Signature"));
}

/// Verifies only signatures inside the window are attached.
#[test]
fn signatures_attach_within_the_window() {
    let (renderer, signatures, submissions) = renderer(EchoRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();

    signatures.store(&signature_at(-SIGNATURE_WINDOW_MILLIS / 2, "sig-close"), b"p").unwrap();
    signatures.store(&signature_at(SIGNATURE_WINDOW_MILLIS * 3, "sig-far"), b"p").unwrap();

    let rendered = renderer
        .render(&sample_definition(), &submission, &patient, None, "artifacts/sub-1.pdf")
        .unwrap();
    let markup = String::from_utf8(rendered.bytes).unwrap();
    assert!(markup.contains("Signatures"));
    assert!(markup.contains("Jane Doe"));
    let close_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, b"signature").value;
    assert!(markup.contains(&close_hash));
    // Exactly one signature block: the far one is excluded.
    assert_eq!(markup.matches("class=\"signature\"").count(), 1);
}

/// Verifies a rasterizer failure records Failed, never Completed.
#[test]
fn rasterizer_failure_records_failed_submission() {
    let (renderer, _, submissions) = renderer(FailingRasterizer);
    let patient = sample_patient();
    let submission = sample_submission(&patient.id);
    submissions.insert(&submission).unwrap();

    let result = renderer.render(
        &sample_definition(),
        &submission,
        &patient,
        None,
        "artifacts/sub-1.pdf",
    );
    assert!(result.is_err());

    let stored = submissions.get(&submission.id).unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Failed);
    assert!(stored.error.unwrap().contains("broken markup"));
    assert!(stored.artifact.is_none());
}
