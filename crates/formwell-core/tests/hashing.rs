// crates/formwell-core/tests/hashing.rs
// ============================================================================
// Module: Canonical Hashing Tests
// Description: Tests for byte and canonical-JSON hashing.
// Purpose: Validate stable, lowercase-hex digests for tamper evidence.
// Dependencies: formwell-core, serde_json
// ============================================================================
//! ## Overview
//! Ensures byte hashing matches the well-known SHA-256 vectors and that
//! canonical JSON hashing is independent of key ordering.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::hash_bytes;
use formwell_core::hashing::hash_canonical_json;
use serde_json::json;

/// SHA-256 of the empty byte slice (well-known constant).
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Verifies the empty input digest matches the published vector.
#[test]
fn empty_input_matches_known_vector() {
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, b"");
    assert_eq!(digest.value, EMPTY_SHA256);
}

/// Verifies digests are lowercase hex of the digest width.
#[test]
fn digest_is_lowercase_hex() {
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, b"formwell");
    assert_eq!(digest.value.len(), 64);
    assert!(digest.value.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

/// Verifies canonical JSON hashing ignores key declaration order.
#[test]
fn canonical_json_hash_is_order_independent() {
    let left = json!({"b": 1, "a": {"y": true, "x": "v"}});
    let right = json!({"a": {"x": "v", "y": true}, "b": 1});
    let left_digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &left).unwrap();
    let right_digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &right).unwrap();
    assert_eq!(left_digest, right_digest);
}
