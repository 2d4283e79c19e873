// crates/formwell-store-sqlite/src/lib.rs
// ============================================================================
// Module: Formwell SQLite Store Library
// Description: Public API surface for the durable SQLite store.
// Purpose: Expose the store, its configuration, and error types.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! Durable implementation of the Formwell storage interfaces backed by
//! `SQLite`. Records persist as canonical JSON with stored content hashes
//! verified on load; compound flag operations run inside one transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
