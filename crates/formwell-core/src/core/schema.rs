// crates/formwell-core/src/core/schema.rs
// ============================================================================
// Module: Formwell Schema Model
// Description: Closed field model parsed from the open data/layout schemas.
// Purpose: Convert JSON-Schema-like documents into typed field specifications.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Form definitions carry an open JSON data schema and a parallel layout
//! hint document. Before rendering or formatting, both convert into a
//! closed, typed model: a list of [`FieldSpec`] values whose [`FieldKind`]
//! variants carry their own constraint payloads. Dispatch then happens via
//! pattern matching instead of runtime type inspection.
//!
//! Conversion fails closed: a schema without a `properties` object or with
//! a non-object root is rejected before any rendering is attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema shape errors raised during conversion.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Root schema is missing the `properties` object.
    #[error("data schema is missing a properties object")]
    MissingProperties,
    /// Root schema declares a non-object type.
    #[error("data schema root type must be object, found {0}")]
    NonObjectRoot(String),
    /// A property declaration could not be converted.
    #[error("field {field}: {reason}")]
    InvalidProperty {
        /// Schema field name.
        field: String,
        /// Human-readable conversion failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Constraint Payloads
// ============================================================================

/// Length and pattern bounds for text-like fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextConstraints {
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Regular expression pattern, passed through to markup verbatim.
    pub pattern: Option<String>,
}

/// Numeric bounds for number fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberConstraints {
    /// Inclusive minimum.
    pub minimum: Option<f64>,
    /// Inclusive maximum.
    pub maximum: Option<f64>,
    /// True when the schema declared `integer` rather than `number`.
    pub integer: bool,
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stored value.
    pub value: String,
    /// Display label (falls back to the value when no `enumNames` entry exists).
    pub label: String,
}

/// Widget used to render a single-choice field.
///
/// # Invariants
/// - Radio is selected only by an explicit layout widget hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceWidget {
    /// Dropdown select showing only the chosen label.
    Dropdown,
    /// Radio group showing every option.
    Radio,
}

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// Closed set of renderable field kinds.
///
/// # Invariants
/// - Every variant carries exactly the constraints its markup needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain single-line text.
    Text(TextConstraints),
    /// Email address input.
    Email(TextConstraints),
    /// URL input.
    Url(TextConstraints),
    /// Phone number input.
    Phone(TextConstraints),
    /// Calendar date input.
    Date,
    /// Multi-line text area.
    LongText(TextConstraints),
    /// Numeric input.
    Number(NumberConstraints),
    /// Boolean toggle.
    Boolean,
    /// Single choice from a fixed option list.
    Choice {
        /// Selectable options in declaration order.
        options: Vec<ChoiceOption>,
        /// Widget used to render the choice.
        widget: ChoiceWidget,
    },
    /// Multiple choices from a fixed option list.
    MultiChoice {
        /// Selectable options in declaration order.
        options: Vec<ChoiceOption>,
    },
    /// Signature capture pad bound to a hidden value carrier.
    Signature,
}

/// Typed specification of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Schema field name (whitespace-trimmed).
    pub name: String,
    /// Schema-declared title, when present.
    pub title: Option<String>,
    /// True when the schema lists the field as required.
    pub required: bool,
    /// Field kind with constraint payload.
    pub kind: FieldKind,
}

// ============================================================================
// SECTION: Layout Hints
// ============================================================================

/// Per-field layout hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldHints {
    /// Widget selection override (e.g. `radio`, `textarea`, `signature`).
    pub widget: Option<String>,
    /// Placeholder override.
    pub placeholder: Option<String>,
    /// Help text override.
    pub help: Option<String>,
}

/// Parsed layout schema: explicit order plus per-field hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutHints {
    /// Explicit field order; empty when the layout declares none.
    pub order: Vec<String>,
    /// Hints keyed by schema field name.
    pub fields: BTreeMap<String, FieldHints>,
}

impl LayoutHints {
    /// Returns the hints for a field, or a default when none are declared.
    #[must_use]
    pub fn for_field(&self, name: &str) -> FieldHints {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

/// Parses a layout schema document into [`LayoutHints`].
///
/// Both bare keys (`order`, `widget`) and `ui:`-prefixed keys (`ui:order`,
/// `ui:widget`) are accepted to tolerate definitions authored against
/// common form-builder conventions. Unknown keys are ignored.
#[must_use]
pub fn parse_layout_schema(layout: &Value) -> LayoutHints {
    let Some(object) = layout.as_object() else {
        return LayoutHints::default();
    };
    let order = object
        .get("ui:order")
        .or_else(|| object.get("order"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let mut fields = BTreeMap::new();
    for (key, value) in object {
        if key == "ui:order" || key == "order" {
            continue;
        }
        let Some(field_object) = value.as_object() else {
            continue;
        };
        let field_hints = FieldHints {
            widget: string_hint(field_object, "widget"),
            placeholder: string_hint(field_object, "placeholder"),
            help: string_hint(field_object, "help"),
        };
        if field_hints != FieldHints::default() {
            fields.insert(key.trim().to_string(), field_hints);
        }
    }
    LayoutHints {
        order,
        fields,
    }
}

/// Reads a hint value under the bare or `ui:`-prefixed key.
fn string_hint(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let prefixed = format!("ui:{key}");
    object
        .get(&prefixed)
        .or_else(|| object.get(key))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

// ============================================================================
// SECTION: Data Schema Conversion
// ============================================================================

/// Converts a data schema plus layout hints into ordered field specs.
///
/// Field order follows the layout's explicit order list when present, then
/// schema property declaration order for any remaining fields. Field names
/// are whitespace-trimmed to tolerate copy-paste artifacts.
///
/// # Errors
///
/// Returns [`SchemaError`] when the schema root is not an object schema or
/// a property declaration cannot be converted.
pub fn parse_data_schema(
    schema: &Value,
    layout: &LayoutHints,
) -> Result<Vec<FieldSpec>, SchemaError> {
    let root = schema.as_object().ok_or(SchemaError::MissingProperties)?;
    if let Some(root_type) = root.get("type").and_then(Value::as_str)
        && root_type != "object"
    {
        return Err(SchemaError::NonObjectRoot(root_type.to_string()));
    }
    let properties = root
        .get("properties")
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingProperties)?;
    let required: Vec<String> = root
        .get("required")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(|name| name.trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut ordered: Vec<(String, &Value)> = Vec::with_capacity(properties.len());
    for name in &layout.order {
        if let Some(property) = properties.get(name.as_str()) {
            ordered.push((name.clone(), property));
        }
    }
    for (name, property) in properties {
        let trimmed = name.trim().to_string();
        if !ordered.iter().any(|(seen, _)| *seen == trimmed) {
            ordered.push((trimmed, property));
        }
    }

    let mut fields = Vec::with_capacity(ordered.len());
    for (name, property) in ordered {
        let hints = layout.for_field(&name);
        let kind = field_kind(&name, property, &hints)?;
        let title = property.get("title").and_then(Value::as_str).map(ToString::to_string);
        let required = required.iter().any(|entry| *entry == name);
        fields.push(FieldSpec {
            name,
            title,
            required,
            kind,
        });
    }
    Ok(fields)
}

/// Collects every schema-shape problem instead of failing fast.
///
/// Used by definition checks that report all problems at once: a missing
/// `properties` node or non-object root is one issue; each unconvertible
/// property declaration adds another.
#[must_use]
pub fn collect_schema_issues(schema: &Value, layout: &LayoutHints) -> Vec<SchemaError> {
    let Some(root) = schema.as_object() else {
        return vec![SchemaError::MissingProperties];
    };
    if let Some(root_type) = root.get("type").and_then(Value::as_str)
        && root_type != "object"
    {
        return vec![SchemaError::NonObjectRoot(root_type.to_string())];
    }
    let Some(properties) = root.get("properties").and_then(Value::as_object) else {
        return vec![SchemaError::MissingProperties];
    };
    let mut issues = Vec::new();
    for (name, property) in properties {
        let trimmed = name.trim();
        let hints = layout.for_field(trimmed);
        if let Err(issue) = field_kind(trimmed, property, &hints) {
            issues.push(issue);
        }
    }
    issues
}

/// Resolves the field kind for one property declaration.
fn field_kind(name: &str, property: &Value, hints: &FieldHints) -> Result<FieldKind, SchemaError> {
    let object = property.as_object().ok_or_else(|| SchemaError::InvalidProperty {
        field: name.to_string(),
        reason: "property declaration must be an object".to_string(),
    })?;
    let declared_type = object.get("type").and_then(Value::as_str).unwrap_or("string");
    let format = object.get("format").and_then(Value::as_str).unwrap_or_default();
    let widget = hints.widget.as_deref().unwrap_or_default();

    if format == "signature" || widget == "signature" {
        return Ok(FieldKind::Signature);
    }
    if let Some(values) = object.get("enum").and_then(Value::as_array) {
        let options = choice_options(name, values, object.get("enumNames"))?;
        let widget =
            if widget == "radio" { ChoiceWidget::Radio } else { ChoiceWidget::Dropdown };
        return Ok(FieldKind::Choice {
            options,
            widget,
        });
    }

    match declared_type {
        "string" => Ok(string_kind(object, format, widget)),
        "integer" => Ok(FieldKind::Number(number_constraints(object, true))),
        "number" => Ok(FieldKind::Number(number_constraints(object, false))),
        "boolean" => Ok(FieldKind::Boolean),
        "array" => {
            let items = object.get("items").and_then(Value::as_object);
            let values = items.and_then(|items| items.get("enum")).and_then(Value::as_array);
            let Some(values) = values else {
                return Err(SchemaError::InvalidProperty {
                    field: name.to_string(),
                    reason: "array fields require an items.enum option list".to_string(),
                });
            };
            let names = items.and_then(|items| items.get("enumNames"));
            let options = choice_options(name, values, names)?;
            Ok(FieldKind::MultiChoice {
                options,
            })
        }
        other => Err(SchemaError::InvalidProperty {
            field: name.to_string(),
            reason: format!("unsupported property type: {other}"),
        }),
    }
}

/// Resolves string-typed properties into a text-like field kind.
fn string_kind(
    object: &serde_json::Map<String, Value>,
    format: &str,
    widget: &str,
) -> FieldKind {
    let constraints = text_constraints(object);
    if widget == "textarea" || format == "long-text" {
        return FieldKind::LongText(constraints);
    }
    match format {
        "email" => FieldKind::Email(constraints),
        "uri" | "url" => FieldKind::Url(constraints),
        "phone" | "tel" => FieldKind::Phone(constraints),
        "date" => FieldKind::Date,
        _ => FieldKind::Text(constraints),
    }
}

/// Extracts text constraints from a property declaration.
fn text_constraints(object: &serde_json::Map<String, Value>) -> TextConstraints {
    TextConstraints {
        min_length: object.get("minLength").and_then(Value::as_u64),
        max_length: object.get("maxLength").and_then(Value::as_u64),
        pattern: object.get("pattern").and_then(Value::as_str).map(ToString::to_string),
    }
}

/// Extracts numeric constraints from a property declaration.
fn number_constraints(object: &serde_json::Map<String, Value>, integer: bool) -> NumberConstraints {
    NumberConstraints {
        minimum: object.get("minimum").and_then(Value::as_f64),
        maximum: object.get("maximum").and_then(Value::as_f64),
        integer,
    }
}

/// Builds the option list for a choice field from `enum` and `enumNames`.
fn choice_options(
    name: &str,
    values: &[Value],
    names: Option<&Value>,
) -> Result<Vec<ChoiceOption>, SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::InvalidProperty {
            field: name.to_string(),
            reason: "enum must contain at least one value".to_string(),
        });
    }
    let labels = names.and_then(Value::as_array);
    let mut options = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let value = scalar_text(value).ok_or_else(|| SchemaError::InvalidProperty {
            field: name.to_string(),
            reason: "enum values must be scalar".to_string(),
        })?;
        let label = labels
            .and_then(|labels| labels.get(index))
            .and_then(Value::as_str)
            .map_or_else(|| value.clone(), ToString::to_string);
        options.push(ChoiceOption {
            value,
            label,
        });
    }
    Ok(options)
}

/// Renders a scalar JSON value as stored option text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
