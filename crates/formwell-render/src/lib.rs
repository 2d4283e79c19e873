// crates/formwell-render/src/lib.rs
// ============================================================================
// Module: Formwell Render Library
// Description: Public API surface for markup and document rendering.
// Purpose: Expose the markup renderer, render cache, and document renderer.
// Dependencies: crate::{cache, document, format, labels, markup}
// ============================================================================

//! ## Overview
//! Formwell render converts form definitions into interactive markup and
//! completed submissions into durable, category-grouped, localized
//! documents. Markup rendering is pure and memoizable through the render
//! cache; document rendering hands assembled markup to the external
//! rasterizer and persists the resulting artifact hash.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod document;
pub mod format;
pub mod labels;
pub mod markup;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::RenderCache;
pub use document::DocumentError;
pub use document::DocumentRenderer;
pub use document::RenderedDocument;
pub use document::SIGNATURE_WINDOW_MILLIS;
pub use format::format_boolean;
pub use format::format_date;
pub use labels::humanize_field_name;
pub use markup::RenderError;
pub use markup::check_definition;
pub use markup::escape_html;
pub use markup::render_fields;
pub use markup::render_preview;
