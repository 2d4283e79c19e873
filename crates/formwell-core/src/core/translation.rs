// crates/formwell-core/src/core/translation.rs
// ============================================================================
// Module: Formwell Translations
// Description: Per-form, per-language string bundles with fixed roles.
// Purpose: Carry localized labels, placeholders, options, and messages.
// Dependencies: crate::core::{identifiers, language}, serde
// ============================================================================

//! ## Overview
//! Each form owns at most one translation per language. A bundle nests
//! strings under fixed top-level roles: field labels, placeholders, help
//! texts, per-field option labels, button labels, validation messages, and
//! free-form messages. Missing keys fall through to schema titles and
//! humanized field names during rendering; lookups here never fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FormId;
use crate::core::language::Language;

// ============================================================================
// SECTION: Bundle
// ============================================================================

/// Nested string bundle for one language.
///
/// # Invariants
/// - Roles are fixed; unknown roles are rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationBundle {
    /// Field labels keyed by schema field name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Placeholders keyed by schema field name.
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
    /// Help texts keyed by schema field name.
    #[serde(default)]
    pub help: BTreeMap<String, String>,
    /// Option labels keyed by schema field name, then stored option value.
    #[serde(default)]
    pub options: BTreeMap<String, BTreeMap<String, String>>,
    /// Button labels keyed by button role (e.g. `submit`, `cancel`).
    #[serde(default)]
    pub buttons: BTreeMap<String, String>,
    /// Validation messages keyed by constraint name.
    #[serde(default)]
    pub validation: BTreeMap<String, String>,
    /// Free-form messages keyed by message name.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl TranslationBundle {
    /// Returns the translated label for a field, if present.
    #[must_use]
    pub fn label_for(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Returns the translated placeholder for a field, if present.
    #[must_use]
    pub fn placeholder_for(&self, field: &str) -> Option<&str> {
        self.placeholders.get(field).map(String::as_str)
    }

    /// Returns the translated help text for a field, if present.
    #[must_use]
    pub fn help_for(&self, field: &str) -> Option<&str> {
        self.help.get(field).map(String::as_str)
    }

    /// Returns the translated label for one option value of a field.
    #[must_use]
    pub fn option_label(&self, field: &str, value: &str) -> Option<&str> {
        self.options.get(field).and_then(|labels| labels.get(value)).map(String::as_str)
    }

    /// Returns the translated button label for a button role.
    #[must_use]
    pub fn button(&self, role: &str) -> Option<&str> {
        self.buttons.get(role).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Translation Record
// ============================================================================

/// Stored translation owned by exactly one form definition.
///
/// # Invariants
/// - Unique per (form, language); duplicates are a store conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Owning form identifier.
    pub form_id: FormId,
    /// Bundle language.
    pub language: Language,
    /// Nested string bundle.
    pub bundle: TranslationBundle,
}
