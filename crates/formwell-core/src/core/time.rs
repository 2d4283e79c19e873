// crates/formwell-core/src/core/time.rs
// ============================================================================
// Module: Formwell Time Model
// Description: Canonical timestamp representation for submissions and records.
// Purpose: Provide deterministic time values across Formwell records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Formwell uses explicit time values embedded in records to keep every
//! operation replayable. The engine never reads wall-clock time directly;
//! hosts must supply timestamps with each mutating call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the engine never reads the clock.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns true when `other` lies within `window_millis` of this timestamp,
    /// before or after.
    #[must_use]
    pub const fn within_window(self, other: Self, window_millis: i64) -> bool {
        let delta = self.0 - other.0;
        let magnitude = if delta < 0 { -delta } else { delta };
        magnitude <= window_millis
    }
}
