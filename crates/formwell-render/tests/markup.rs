// crates/formwell-render/tests/markup.rs
// ============================================================================
// Module: Markup Renderer Tests
// Description: Tests for schema-to-markup field rendering.
// Purpose: Validate ordering, label fallbacks, constraints, and dispatch.
// Dependencies: formwell-core, formwell-render, serde_json
// ============================================================================
//! ## Overview
//! Ensures rendered fields follow the layout order, resolve labels through
//! the fallback chain, carry native validation attributes, dispatch radio
//! versus dropdown by widget hint, and that a satisfying submission for
//! the rendered schema validates cleanly (the render/validate round-trip).

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
use common::satisfying_values;
use formwell_core::Language;
use formwell_core::SchemaError;
use formwell_core::Translation;
use formwell_core::TranslationBundle;
use formwell_core::ValidationEngine;
use formwell_render::check_definition;
use formwell_render::render_fields;
use formwell_render::render_preview;
use serde_json::json;

fn german_bundle() -> TranslationBundle {
    let mut bundle = TranslationBundle::default();
    bundle.fields.insert("firstName".to_string(), "Vorname".to_string());
    bundle.placeholders.insert("firstName".to_string(), "z. B. Anna".to_string());
    bundle
        .options
        .entry("bloodType".to_string())
        .or_default()
        .insert("0".to_string(), "Null".to_string());
    bundle.buttons.insert("submit".to_string(), "Absenden".to_string());
    bundle
}

/// Verifies fields render in the layout order.
#[test]
fn fields_follow_layout_order() {
    let markup = render_fields(&sample_definition(), None).unwrap();
    let first = markup.find("data-field=\"firstName\"").unwrap();
    let blood = markup.find("data-field=\"bloodType\"").unwrap();
    let signature = markup.find("data-field=\"patientSignature\"").unwrap();
    assert!(first < blood);
    assert!(blood < signature);
}

/// Verifies the label chain: translation, then title, then humanized.
#[test]
fn label_fallback_chain() {
    let definition = sample_definition();
    let bundle = german_bundle();
    let markup = render_fields(&definition, Some(&bundle)).unwrap();
    // Translation wins.
    assert!(markup.contains(">Vorname<span class=\"required\">*</span></label>"));
    // Humanized camelCase fallback for untranslated fields.
    assert!(markup.contains(">Last Name<span class=\"required\">*</span></label>"));
    // Translated placeholder is carried onto the control.
    assert!(markup.contains("placeholder=\"z. B. Anna\""));
}

/// Verifies constraints become native validation attributes.
#[test]
fn constraints_become_native_attributes() {
    let markup = render_fields(&sample_definition(), None).unwrap();
    assert!(markup.contains("minlength=\"2\""));
    assert!(markup.contains("maxlength=\"60\""));
    assert!(markup.contains("type=\"email\""));
    assert!(markup.contains("type=\"date\""));
    // Required fields carry the required attribute on their control.
    assert!(markup.contains(" required/>"));
}

/// Verifies the radio hint renders a radio group, not a dropdown.
#[test]
fn radio_widget_hint_selects_radio_group() {
    let definition = sample_definition();
    let markup = render_fields(&definition, None).unwrap();
    assert!(markup.contains("type=\"radio\""));
    assert!(!markup.contains("<select id=\"field-bloodType\""));

    // Without the hint the same field renders as a dropdown.
    let mut plain = definition;
    plain.layout_schema = json!({});
    let markup = render_fields(&plain, None).unwrap();
    assert!(markup.contains("<select id=\"field-bloodType\""));
}

/// Verifies translated option labels replace the declared enum names.
#[test]
fn option_labels_resolve_from_bundle() {
    let markup = render_fields(&sample_definition(), Some(&german_bundle())).unwrap();
    assert!(markup.contains("value=\"0\""));
    assert!(markup.contains("Null"));
}

/// Verifies the signature field renders a pad with a hidden carrier.
#[test]
fn signature_field_renders_pad_and_carrier() {
    let markup = render_fields(&sample_definition(), None).unwrap();
    assert!(markup.contains("class=\"signature-pad\""));
    assert!(markup.contains("type=\"hidden\" id=\"field-patientSignature\""));
}

/// Verifies the textarea widget hint renders a multi-line control.
#[test]
fn textarea_widget_hint_renders_textarea() {
    let markup = render_fields(&sample_definition(), None).unwrap();
    assert!(markup.contains("<textarea id=\"field-notes\""));
    assert!(markup.contains("placeholder=\"Anything else?\""));
}

/// Verifies the preview document is standalone with localized actions.
#[test]
fn preview_document_is_standalone() {
    let preview =
        render_preview(&sample_definition(), Language::De, Some(&german_bundle())).unwrap();
    assert!(preview.starts_with("<!DOCTYPE html>"));
    assert!(preview.contains("lang=\"de\""));
    assert!(preview.contains("dir=\"ltr\""));
    assert!(preview.contains(">Absenden</button>"));
    assert!(preview.contains(">Cancel</button>"));
}

/// Verifies right-to-left languages carry the matching direction.
#[test]
fn rtl_language_sets_direction() {
    let preview = render_preview(&sample_definition(), Language::Ar, None).unwrap();
    assert!(preview.contains("dir=\"rtl\""));
}

/// Verifies the render/validate round-trip: a satisfying map is valid.
#[test]
fn rendered_schema_round_trips_with_validation() {
    let definition = sample_definition();
    render_fields(&definition, None).unwrap();
    let engine = ValidationEngine::new();
    let report = engine.validate(&definition.data_schema, &satisfying_values()).unwrap();
    assert!(report.is_valid(), "errors: {:?}", report.all_errors());
}

/// Verifies interpolated text is escaped in the output.
#[test]
fn labels_are_escaped() {
    let mut definition = sample_definition();
    definition.name = "Intake <script>".to_string();
    let preview = render_preview(&definition, Language::En, None).unwrap();
    assert!(preview.contains("Intake &lt;script&gt;"));
    assert!(!preview.contains("Intake <script>"));
}

/// Verifies definition checks report shape problems without rendering.
#[test]
fn check_definition_reports_shape_problems() {
    let mut definition = sample_definition();
    definition.data_schema = json!({"type": "object"});
    let issues = check_definition(&definition);
    assert!(matches!(issues.as_slice(), [SchemaError::MissingProperties]));

    definition.data_schema = json!({"type": "array"});
    let issues = check_definition(&definition);
    assert!(matches!(issues.as_slice(), [SchemaError::NonObjectRoot(_)]));

    definition.data_schema = json!({
        "type": "object",
        "properties": {"weird": {"type": "blob"}}
    });
    let issues = check_definition(&definition);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].to_string().contains("weird"));

    // A clean definition reports nothing.
    assert!(check_definition(&sample_definition()).is_empty());
}

/// Verifies translations attach to definitions as owned records.
#[test]
fn translation_record_carries_owner_and_language() {
    let translation = Translation {
        form_id: sample_definition().id,
        language: Language::De,
        bundle: german_bundle(),
    };
    assert_eq!(translation.language, Language::De);
    assert_eq!(translation.bundle.label_for("firstName"), Some("Vorname"));
}
