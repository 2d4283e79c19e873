// crates/formwell-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: Tests for the JSONL audit sink and event payloads.
// Purpose: Validate stable event names and append-only file behavior.
// Dependencies: formwell-core, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Ensures audit events serialize with stable names and the JSONL sink
//! appends one parseable object per line without carrying raw values.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formwell_core::AuditEvent;
use formwell_core::AuditSink;
use formwell_core::FormId;
use formwell_core::JsonlAuditSink;
use formwell_core::Language;
use formwell_core::SubmissionId;
use formwell_core::Timestamp;
use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::hash_bytes;
use serde_json::Value;
use tempfile::TempDir;

/// Verifies events land as one JSON object per line with stable names.
#[test]
fn jsonl_sink_appends_one_event_per_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = JsonlAuditSink::open(&path).unwrap();

    sink.record(&AuditEvent::DefinitionPublished {
        form_id: FormId::new("form-1"),
        published_by: "dr-adams".to_string(),
        published_at: Timestamp::from_unix_millis(2_000),
        activated: true,
    });
    sink.record(&AuditEvent::SubmissionCompleted {
        submission_id: SubmissionId::new("sub-1"),
        language: Language::De,
        content_hash: hash_bytes(DEFAULT_HASH_ALGORITHM, b"artifact"),
    });

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["event"], "definition_published");
    assert_eq!(first["form_id"], "form-1");

    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["event"], "submission_completed");
    assert_eq!(second["language"], "de");
}
