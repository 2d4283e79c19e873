// crates/formwell-render/src/markup.rs
// ============================================================================
// Module: Formwell Markup Renderer
// Description: Schema-to-markup rendering of interactive form fields.
// Purpose: Produce self-contained field fragments and preview documents.
// Dependencies: formwell-core
// ============================================================================

//! ## Overview
//! The markup renderer converts a definition's data schema, layout schema,
//! and optional translation bundle into interactive HTML. Field order
//! follows the layout's explicit order list, then schema declaration
//! order. Every constraint (required, length bounds, numeric bounds,
//! pattern) becomes a native validation attribute on the emitted control.
//! Rendering is a pure function of its inputs and safe to memoize per
//! (definition, language).

// ============================================================================
// SECTION: Imports
// ============================================================================

use formwell_core::ChoiceWidget;
use formwell_core::FieldKind;
use formwell_core::FieldSpec;
use formwell_core::FormDefinition;
use formwell_core::Language;
use formwell_core::NumberConstraints;
use formwell_core::SchemaError;
use formwell_core::TextConstraints;
use formwell_core::TranslationBundle;
use formwell_core::collect_schema_issues;
use formwell_core::parse_data_schema;
use formwell_core::parse_layout_schema;
use thiserror::Error;

use crate::labels::resolve_help;
use crate::labels::resolve_label;
use crate::labels::resolve_option_label;
use crate::labels::resolve_placeholder;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Markup rendering errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The definition's data schema failed shape conversion.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// ============================================================================
// SECTION: Public Surface
// ============================================================================

/// Renders the field fragment for a definition.
///
/// The output is a self-contained markup fragment without document
/// scaffolding; [`render_preview`] wraps it into a standalone page.
///
/// # Errors
///
/// Returns [`RenderError::Schema`] when the data schema cannot be
/// converted.
pub fn render_fields(
    definition: &FormDefinition,
    bundle: Option<&TranslationBundle>,
) -> Result<String, RenderError> {
    let layout = parse_layout_schema(&definition.layout_schema);
    let fields = parse_data_schema(&definition.data_schema, &layout)?;
    let mut out = String::new();
    for field in &fields {
        let hints = layout.for_field(&field.name);
        let label = resolve_label(field, bundle);
        let placeholder = resolve_placeholder(field, &hints, bundle);
        let help = resolve_help(field, &hints, bundle);
        render_field(&mut out, field, &label, placeholder.as_deref(), help.as_deref(), bundle);
    }
    Ok(out)
}

/// Renders a standalone preview document with styling and actions.
///
/// # Errors
///
/// Returns [`RenderError::Schema`] when the data schema cannot be
/// converted.
pub fn render_preview(
    definition: &FormDefinition,
    language: Language,
    bundle: Option<&TranslationBundle>,
) -> Result<String, RenderError> {
    let fields = render_fields(definition, bundle)?;
    let submit = bundle.and_then(|bundle| bundle.button("submit")).unwrap_or("Submit");
    let cancel = bundle.and_then(|bundle| bundle.button("cancel")).unwrap_or("Cancel");
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!(
        "<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\"/>\n<title>{}</title>\n",
        language.as_tag(),
        language.direction().html_dir(),
        escape_html(&definition.name)
    ));
    out.push_str("<style>\n");
    out.push_str(PREVIEW_STYLE);
    out.push_str("</style>\n</head>\n<body>\n<form class=\"intake-form\">\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&definition.name)));
    out.push_str(&fields);
    out.push_str(&format!(
        "<div class=\"form-actions\">\n<button type=\"submit\">{}</button>\n<button \
         type=\"button\" class=\"cancel\">{}</button>\n</div>\n",
        escape_html(submit),
        escape_html(cancel)
    ));
    out.push_str("</form>\n</body>\n</html>\n");
    Ok(out)
}

/// Reports schema-shape problems of a definition without rendering.
///
/// A missing `properties` node, a non-object root type, and every
/// property that fails dry-run conversion each contribute one issue; an
/// empty result means the definition renders cleanly.
#[must_use]
pub fn check_definition(definition: &FormDefinition) -> Vec<SchemaError> {
    let layout = parse_layout_schema(&definition.layout_schema);
    collect_schema_issues(&definition.data_schema, &layout)
}

// ============================================================================
// SECTION: Field Rendering
// ============================================================================

/// Inline stylesheet for preview documents.
const PREVIEW_STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:40rem}\n\
.form-field{margin-bottom:1rem}\n\
.form-field label{display:block;font-weight:600;margin-bottom:.25rem}\n\
.form-field input,.form-field select,.form-field textarea{width:100%;padding:.4rem}\n\
.form-field .help{color:#555}\n\
.required{color:#b00}\n\
.signature-pad{border:1px solid #999;width:100%;height:8rem}\n\
.form-actions{margin-top:1.5rem;display:flex;gap:.5rem}\n";

/// Renders one field into the output fragment.
fn render_field(
    out: &mut String,
    field: &FieldSpec,
    label: &str,
    placeholder: Option<&str>,
    help: Option<&str>,
    bundle: Option<&TranslationBundle>,
) {
    let name = escape_html(&field.name);
    let control_id = format!("field-{name}");
    out.push_str(&format!("<div class=\"form-field\" data-field=\"{name}\">\n"));
    let required_marker =
        if field.required { "<span class=\"required\">*</span>" } else { "" };
    match &field.kind {
        FieldKind::Boolean => {
            out.push_str(&format!(
                "<label><input type=\"checkbox\" id=\"{control_id}\" \
                 name=\"{name}\"{}/> {}{required_marker}</label>\n",
                required_attr(field),
                escape_html(label)
            ));
        }
        _ => {
            out.push_str(&format!(
                "<label for=\"{control_id}\">{}{required_marker}</label>\n",
                escape_html(label)
            ));
            render_control(out, field, &control_id, &name, placeholder, bundle);
        }
    }
    if let Some(help) = help {
        out.push_str(&format!("<small class=\"help\">{}</small>\n", escape_html(help)));
    }
    out.push_str("</div>\n");
}

/// Renders the input control for a non-boolean field.
fn render_control(
    out: &mut String,
    field: &FieldSpec,
    control_id: &str,
    name: &str,
    placeholder: Option<&str>,
    bundle: Option<&TranslationBundle>,
) {
    match &field.kind {
        FieldKind::Text(constraints) => {
            render_input(out, "text", field, constraints, control_id, name, placeholder);
        }
        FieldKind::Email(constraints) => {
            render_input(out, "email", field, constraints, control_id, name, placeholder);
        }
        FieldKind::Url(constraints) => {
            render_input(out, "url", field, constraints, control_id, name, placeholder);
        }
        FieldKind::Phone(constraints) => {
            render_input(out, "tel", field, constraints, control_id, name, placeholder);
        }
        FieldKind::Date => {
            out.push_str(&format!(
                "<input type=\"date\" id=\"{control_id}\" name=\"{name}\"{}/>\n",
                required_attr(field)
            ));
        }
        FieldKind::LongText(constraints) => {
            out.push_str(&format!(
                "<textarea id=\"{control_id}\" name=\"{name}\" \
                 rows=\"4\"{}{}{}></textarea>\n",
                length_attrs(constraints),
                placeholder_attr(placeholder),
                required_attr(field)
            ));
        }
        FieldKind::Number(constraints) => {
            render_number(out, field, constraints, control_id, name, placeholder);
        }
        FieldKind::Choice {
            options,
            widget,
        } => match widget {
            ChoiceWidget::Dropdown => {
                out.push_str(&format!(
                    "<select id=\"{control_id}\" name=\"{name}\"{}>\n",
                    required_attr(field)
                ));
                for option in options {
                    let label =
                        resolve_option_label(&field.name, &option.value, &option.label, bundle);
                    out.push_str(&format!(
                        "<option value=\"{}\">{}</option>\n",
                        escape_html(&option.value),
                        escape_html(&label)
                    ));
                }
                out.push_str("</select>\n");
            }
            ChoiceWidget::Radio => {
                for (index, option) in options.iter().enumerate() {
                    let label =
                        resolve_option_label(&field.name, &option.value, &option.label, bundle);
                    out.push_str(&format!(
                        "<label><input type=\"radio\" id=\"{control_id}-{index}\" \
                         name=\"{name}\" value=\"{}\"{}/> {}</label>\n",
                        escape_html(&option.value),
                        required_attr(field),
                        escape_html(&label)
                    ));
                }
            }
        },
        FieldKind::MultiChoice {
            options,
        } => {
            for (index, option) in options.iter().enumerate() {
                let label =
                    resolve_option_label(&field.name, &option.value, &option.label, bundle);
                out.push_str(&format!(
                    "<label><input type=\"checkbox\" id=\"{control_id}-{index}\" \
                     name=\"{name}\" value=\"{}\"/> {}</label>\n",
                    escape_html(&option.value),
                    escape_html(&label)
                ));
            }
        }
        FieldKind::Signature => {
            out.push_str(&format!(
                "<canvas class=\"signature-pad\" data-input=\"{control_id}\"></canvas>\n\
                 <input type=\"hidden\" id=\"{control_id}\" name=\"{name}\"{}/>\n",
                required_attr(field)
            ));
        }
        FieldKind::Boolean => {}
    }
}

/// Renders a text-like input with its constraint attributes.
fn render_input(
    out: &mut String,
    input_type: &str,
    field: &FieldSpec,
    constraints: &TextConstraints,
    control_id: &str,
    name: &str,
    placeholder: Option<&str>,
) {
    out.push_str(&format!(
        "<input type=\"{input_type}\" id=\"{control_id}\" name=\"{name}\"{}{}{}{}/>\n",
        length_attrs(constraints),
        pattern_attr(constraints),
        placeholder_attr(placeholder),
        required_attr(field)
    ));
}

/// Renders a numeric input with its bound attributes.
fn render_number(
    out: &mut String,
    field: &FieldSpec,
    constraints: &NumberConstraints,
    control_id: &str,
    name: &str,
    placeholder: Option<&str>,
) {
    let mut attrs = String::new();
    if let Some(minimum) = constraints.minimum {
        attrs.push_str(&format!(" min=\"{minimum}\""));
    }
    if let Some(maximum) = constraints.maximum {
        attrs.push_str(&format!(" max=\"{maximum}\""));
    }
    let step = if constraints.integer { "1" } else { "any" };
    out.push_str(&format!(
        "<input type=\"number\" id=\"{control_id}\" name=\"{name}\" \
         step=\"{step}\"{attrs}{}{}/>\n",
        placeholder_attr(placeholder),
        required_attr(field)
    ));
}

// ============================================================================
// SECTION: Attribute Helpers
// ============================================================================

/// Returns the required attribute for a field.
const fn required_attr(field: &FieldSpec) -> &'static str {
    if field.required { " required" } else { "" }
}

/// Returns length bound attributes for text constraints.
fn length_attrs(constraints: &TextConstraints) -> String {
    let mut attrs = String::new();
    if let Some(min_length) = constraints.min_length {
        attrs.push_str(&format!(" minlength=\"{min_length}\""));
    }
    if let Some(max_length) = constraints.max_length {
        attrs.push_str(&format!(" maxlength=\"{max_length}\""));
    }
    attrs
}

/// Returns the pattern attribute for text constraints.
fn pattern_attr(constraints: &TextConstraints) -> String {
    constraints
        .pattern
        .as_deref()
        .map(|pattern| format!(" pattern=\"{}\"", escape_html(pattern)))
        .unwrap_or_default()
}

/// Returns the placeholder attribute, when present.
fn placeholder_attr(placeholder: Option<&str>) -> String {
    placeholder
        .map(|placeholder| format!(" placeholder=\"{}\"", escape_html(placeholder)))
        .unwrap_or_default()
}

/// Escapes text for safe interpolation into markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
