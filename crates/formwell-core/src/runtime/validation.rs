// crates/formwell-core/src/runtime/validation.rs
// ============================================================================
// Module: Formwell Validation Engine
// Description: Structural validation of submitted values against data schemas.
// Purpose: Return validation outcomes as data, never as exceptions.
// Dependencies: jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! The validation engine compiles a definition's data schema (Draft
//! 2020-12, format assertions on) and checks a submitted value map against
//! it: type checks, required presence, length/pattern bounds, numeric
//! bounds, enumerations, and string formats such as email. Violations are
//! collected into a [`ValidationReport`]; validation failure is a result,
//! not an error, so callers can re-render the form with errors attached.
//! Only an uncompilable schema is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use jsonschema::Draft;
use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Validation engine errors.
///
/// # Invariants
/// - Validation outcomes are never errors; only schema compilation fails.
#[derive(Debug, Error)]
pub enum ValidationEngineError {
    /// The data schema itself could not be compiled.
    #[error("invalid data schema: {0}")]
    InvalidSchema(String),
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of validating one submitted value map.
///
/// # Invariants
/// - `field_errors` keys are bare field names (path-normalized).
/// - An empty report means the submission is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Violations attributed to a field, one or more messages each.
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Violations with no resolvable field (schema-root-level).
    pub global_errors: Vec<String>,
}

impl ValidationReport {
    /// Returns true when no violations were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.global_errors.is_empty()
    }

    /// Returns every violation flattened as `"field: message"` strings,
    /// with global violations appended verbatim.
    #[must_use]
    pub fn all_errors(&self) -> Vec<String> {
        let mut flattened = Vec::new();
        for (field, messages) in &self.field_errors {
            for message in messages {
                flattened.push(format!("{field}: {message}"));
            }
        }
        flattened.extend(self.global_errors.iter().cloned());
        flattened
    }

    /// Returns the first violation for quick user feedback.
    #[must_use]
    pub fn first_error(&self) -> Option<String> {
        self.all_errors().into_iter().next()
    }

    /// Records one violation for a field.
    fn push_field(&mut self, field: String, message: String) {
        self.field_errors.entry(field).or_default().push(message);
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Structural validator for submitted value maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    /// Creates a validation engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a submitted value map against a data schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationEngineError::InvalidSchema`] when the schema
    /// cannot be compiled. Validation violations are returned in the
    /// report, never as errors.
    pub fn validate(
        &self,
        schema: &Value,
        values: &BTreeMap<String, Value>,
    ) -> Result<ValidationReport, ValidationEngineError> {
        let validator = compile_schema(schema)?;
        let document = to_document(values);
        let mut report = ValidationReport::default();
        for violation in validator.iter_errors(&document) {
            let message = violation.to_string();
            let field = match violation.kind() {
                ValidationErrorKind::Required {
                    property,
                } => {
                    // The property payload renders JSON-quoted; strip the quotes.
                    Some(property.to_string().trim_matches('"').to_string())
                }
                _ => {
                    let path = violation.instance_path().to_string();
                    normalize_field_path(&path)
                }
            };
            match field {
                Some(field) => report.push_field(field, message),
                None => report.global_errors.push(message),
            }
        }
        Ok(report)
    }
}

/// Compiles a data schema for validation.
fn compile_schema(schema: &Value) -> Result<Validator, ValidationEngineError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .should_validate_formats(true)
        .build(schema)
        .map_err(|err| ValidationEngineError::InvalidSchema(err.to_string()))
}

/// Coerces the flat value map into a structured JSON document.
fn to_document(values: &BTreeMap<String, Value>) -> Value {
    let mut object = serde_json::Map::with_capacity(values.len());
    for (name, value) in values {
        object.insert(name.trim().to_string(), value.clone());
    }
    Value::Object(object)
}

/// Normalizes a violation path to a bare field name.
///
/// Both slash-delimited pointers (`/patient/email`) and dotted paths
/// (`patient.email`) resolve to their final segment; empty paths resolve
/// to none and become global errors.
fn normalize_field_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .rsplit(['/', '.'])
        .find(|segment| !segment.is_empty())
        .map(ToString::to_string)
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

    use super::normalize_field_path;

    /// Verifies pointer and dotted paths normalize to the final segment.
    #[test]
    fn path_normalization_handles_both_conventions() {
        assert_eq!(normalize_field_path("/email"), Some("email".to_string()));
        assert_eq!(normalize_field_path("patient.email"), Some("email".to_string()));
        assert_eq!(normalize_field_path("/patient/email"), Some("email".to_string()));
        assert_eq!(normalize_field_path(""), None);
        assert_eq!(normalize_field_path("/"), None);
    }
}
