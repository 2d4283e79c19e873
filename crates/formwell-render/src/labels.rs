// crates/formwell-render/src/labels.rs
// ============================================================================
// Module: Formwell Label Resolution
// Description: Label, placeholder, and help text resolution for fields.
// Purpose: Apply the translation-first fallback chain consistently.
// Dependencies: formwell-core
// ============================================================================

//! ## Overview
//! Labels resolve through a fixed chain: the translation bundle wins, then
//! the schema-declared title, then a humanized form of the camelCase field
//! name. Placeholders and help texts resolve translation-first, then the
//! layout-schema override, then nothing. Missing entries never fail a
//! render.

// ============================================================================
// SECTION: Imports
// ============================================================================

use formwell_core::FieldHints;
use formwell_core::FieldSpec;
use formwell_core::TranslationBundle;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the display label for a field.
#[must_use]
pub fn resolve_label(field: &FieldSpec, bundle: Option<&TranslationBundle>) -> String {
    if let Some(label) = bundle.and_then(|bundle| bundle.label_for(&field.name)) {
        return label.to_string();
    }
    if let Some(title) = field.title.as_deref()
        && !title.trim().is_empty()
    {
        return title.to_string();
    }
    humanize_field_name(&field.name)
}

/// Resolves the placeholder for a field, if any.
#[must_use]
pub fn resolve_placeholder(
    field: &FieldSpec,
    hints: &FieldHints,
    bundle: Option<&TranslationBundle>,
) -> Option<String> {
    bundle
        .and_then(|bundle| bundle.placeholder_for(&field.name))
        .map(ToString::to_string)
        .or_else(|| hints.placeholder.clone())
}

/// Resolves the help text for a field, if any.
#[must_use]
pub fn resolve_help(
    field: &FieldSpec,
    hints: &FieldHints,
    bundle: Option<&TranslationBundle>,
) -> Option<String> {
    bundle
        .and_then(|bundle| bundle.help_for(&field.name))
        .map(ToString::to_string)
        .or_else(|| hints.help.clone())
}

/// Resolves the display label for one option value of a field.
#[must_use]
pub fn resolve_option_label(
    field_name: &str,
    value: &str,
    declared_label: &str,
    bundle: Option<&TranslationBundle>,
) -> String {
    bundle
        .and_then(|bundle| bundle.option_label(field_name, value))
        .map_or_else(|| declared_label.to_string(), ToString::to_string)
}

// ============================================================================
// SECTION: Humanization
// ============================================================================

/// Turns a camelCase or snake_case field name into a readable label.
///
/// `firstName` becomes `First Name`; `insurance_number` becomes
/// `Insurance Number`.
#[must_use]
pub fn humanize_field_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.trim().chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    let mut label = String::new();
    for word in words {
        if !label.is_empty() {
            label.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }
    }
    label
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::humanize_field_name;

    /// Verifies camelCase and snake_case names humanize to readable labels.
    #[test]
    fn field_names_humanize() {
        assert_eq!(humanize_field_name("firstName"), "First Name");
        assert_eq!(humanize_field_name("insurance_number"), "Insurance Number");
        assert_eq!(humanize_field_name(" email "), "Email");
    }
}
