// crates/formwell-render/src/cache.rs
// ============================================================================
// Module: Formwell Render Cache
// Description: Markup cache keyed by (definition, language).
// Purpose: Memoize pure renders with deterministic, explicit invalidation.
// Dependencies: formwell-core
// ============================================================================

//! ## Overview
//! Rendering markup for a (definition, language) pair is a pure function
//! of its inputs, so the result may be memoized. This cache is populated
//! lazily and invalidated explicitly: the lifecycle manager notifies it
//! through [`RenderCacheHook`] whenever a definition's schema, layout,
//! mapping table, or translations change, and the entry for every known
//! language of that form is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use formwell_core::FormId;
use formwell_core::Language;
use formwell_core::RenderCacheHook;

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Markup cache keyed by (form, language).
#[derive(Debug, Default, Clone)]
pub struct RenderCache {
    /// Cached fragments protected by a mutex.
    entries: Arc<Mutex<BTreeMap<(String, Language), String>>>,
}

impl RenderCache {
    /// Creates an empty render cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached markup for a pair, if present.
    #[must_use]
    pub fn get(&self, form_id: &FormId, language: Language) -> Option<String> {
        let guard = self.entries.lock().ok()?;
        guard.get(&(form_id.as_str().to_string(), language)).cloned()
    }

    /// Stores rendered markup for a pair.
    pub fn put(&self, form_id: &FormId, language: Language, markup: String) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert((form_id.as_str().to_string(), language), markup);
        }
    }

    /// Returns the cached markup or renders and stores it.
    ///
    /// # Errors
    ///
    /// Propagates the renderer's error; nothing is cached on failure.
    pub fn get_or_render<E>(
        &self,
        form_id: &FormId,
        language: Language,
        render: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(cached) = self.get(form_id, language) {
            return Ok(cached);
        }
        let markup = render()?;
        self.put(form_id, language, markup.clone());
        Ok(markup)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or_default()
    }

    /// Returns true when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RenderCacheHook for RenderCache {
    fn invalidate_form(&self, form_id: &FormId) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.retain(|(cached_form, _), _| cached_form != form_id.as_str());
        }
    }
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

    use formwell_core::FormId;
    use formwell_core::Language;
    use formwell_core::RenderCacheHook;

    use super::RenderCache;

    /// Verifies lazy population and the invalidate-all-languages rule.
    #[test]
    fn cache_round_trip_and_invalidation() {
        let cache = RenderCache::new();
        let form = FormId::new("form-1");
        let rendered: Result<String, ()> =
            cache.get_or_render(&form, Language::De, || Ok("<div/>".to_string()));
        assert_eq!(rendered.unwrap(), "<div/>");
        cache.put(&form, Language::En, "<en/>".to_string());
        assert_eq!(cache.len(), 2);

        // A second render must hit the cache, not the closure.
        let cached: Result<String, ()> =
            cache.get_or_render(&form, Language::De, || panic!("expected cache hit"));
        assert_eq!(cached.unwrap(), "<div/>");

        cache.invalidate_form(&form);
        assert!(cache.is_empty());
    }
}
