// crates/formwell-core/src/core/definition.rs
// ============================================================================
// Module: Formwell Form Definitions
// Description: Form definition model with category, lifecycle, and mappings.
// Purpose: Capture the operator-authored schema, layout, and mapping table.
// Dependencies: crate::core::{identifiers, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! A form definition bundles the data schema, the layout schema, and the
//! field-mapping table under one identity with a lifecycle status. Draft is
//! the only mutable status; published definitions are immutable and may
//! only toggle the orthogonal `is_active` bit or be archived.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::FieldTypeKey;
use crate::core::identifiers::FormId;
use crate::core::identifiers::FormVersion;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Category
// ============================================================================

/// Fixed category of an intake form.
///
/// # Invariants
/// - Variants are stable for serialization and category-scoped invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormCategory {
    /// Medical history questionnaire.
    Anamnesis,
    /// Consent and privacy form.
    Consent,
    /// Treatment-specific form.
    Treatment,
    /// Operator-defined form.
    Custom,
}

impl FormCategory {
    /// Returns a stable label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anamnesis => "anamnesis",
            Self::Consent => "consent",
            Self::Treatment => "treatment",
            Self::Custom => "custom",
        }
    }
}

// ============================================================================
// SECTION: Lifecycle Status
// ============================================================================

/// Lifecycle status of a form definition.
///
/// # Invariants
/// - Draft is the only status permitting update or delete.
/// - Archived is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Mutable authoring state.
    Draft,
    /// Published and immutable.
    Published,
    /// Terminal retired state.
    Archived,
}

impl FormStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

// ============================================================================
// SECTION: Form Definition
// ============================================================================

/// Operator-authored form definition.
///
/// # Invariants
/// - At most one published+active definition exists per category.
/// - At most one default definition exists per category.
/// - `data_schema` and `layout_schema` are open JSON documents; typed
///   conversion happens in [`crate::core::schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Form identifier.
    pub id: FormId,
    /// Operator-facing name.
    pub name: String,
    /// Form category.
    pub category: FormCategory,
    /// Semantic version string.
    pub version: FormVersion,
    /// Lifecycle status.
    pub status: FormStatus,
    /// True when this definition is served to end users.
    pub is_active: bool,
    /// True when this definition is the category default.
    pub is_default: bool,
    /// JSON-Schema-like data schema.
    pub data_schema: Value,
    /// Per-field layout hint document.
    pub layout_schema: Value,
    /// Mapping from schema field name to registered field type key.
    pub field_mappings: BTreeMap<String, FieldTypeKey>,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Publish timestamp, set once on publish.
    pub published_at: Option<Timestamp>,
    /// Publish author, set once on publish.
    pub published_by: Option<String>,
}

impl FormDefinition {
    /// Returns true while the definition is in the mutable Draft status.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self.status, FormStatus::Draft)
    }

    /// Returns true when the definition is published.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        matches!(self.status, FormStatus::Published)
    }

    /// Returns the field type key mapped to a schema field, if any.
    #[must_use]
    pub fn mapping_for(&self, field: &str) -> Option<&FieldTypeKey> {
        self.field_mappings.get(field)
    }
}

// ============================================================================
// SECTION: Draft Changes
// ============================================================================

/// Mutable portion of a draft definition applied by update operations.
///
/// # Invariants
/// - `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionUpdate {
    /// New operator-facing name.
    pub name: Option<String>,
    /// New semantic version string.
    pub version: Option<FormVersion>,
    /// Replacement data schema.
    pub data_schema: Option<Value>,
    /// Replacement layout schema.
    pub layout_schema: Option<Value>,
    /// Replacement field-mapping table.
    pub field_mappings: Option<BTreeMap<String, FieldTypeKey>>,
    /// New default flag; clearing another default is the manager's job.
    pub is_default: Option<bool>,
}
