// crates/formwell-core/src/audit.rs
// ============================================================================
// Module: Formwell Audit Logging
// Description: Structured audit events for engine operations.
// Purpose: Emit operational events without hard logging dependencies.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for engine
//! operations. It is intentionally lightweight so deployments can route
//! events to their preferred logging pipeline without redesign. Events
//! carry identifiers and hashes only, never raw submitted values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::FormId;
use crate::core::HashDigest;
use crate::core::Language;
use crate::core::PatientId;
use crate::core::SubmissionId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event emitted by engine operations.
///
/// # Invariants
/// - `event` labels are stable for downstream pipelines.
/// - Events never carry raw submitted values.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A definition was published.
    DefinitionPublished {
        /// Published form identifier.
        form_id: FormId,
        /// Publish author.
        published_by: String,
        /// Publish timestamp.
        published_at: Timestamp,
        /// True when the definition was activated in the same operation.
        activated: bool,
    },
    /// A definition was archived.
    DefinitionArchived {
        /// Archived form identifier.
        form_id: FormId,
        /// Archive timestamp.
        archived_at: Timestamp,
    },
    /// A submission was canonicalized onto a patient record.
    SubmissionCanonicalized {
        /// Submission identifier.
        submission_id: SubmissionId,
        /// Resolved patient identifier.
        patient_id: PatientId,
        /// True when a new patient record was created.
        patient_created: bool,
        /// Number of signatures extracted from the submission.
        signatures: usize,
    },
    /// A document artifact was produced for a submission.
    SubmissionCompleted {
        /// Submission identifier.
        submission_id: SubmissionId,
        /// Document language.
        language: Language,
        /// Content hash of the artifact bytes.
        content_hash: HashDigest,
    },
    /// Document production failed for a submission.
    SubmissionFailed {
        /// Submission identifier.
        submission_id: SubmissionId,
        /// Failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for engine events.
pub trait AuditSink: Send + Sync {
    /// Records one audit event. Sinks must not fail the calling operation.
    fn record(&self, event: &AuditEvent);
}

/// No-op audit sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// File-appending sink writing one JSON object per line.
pub struct JsonlAuditSink {
    /// Append handle guarded for concurrent writers.
    file: Mutex<std::fs::File>,
}

impl JsonlAuditSink {
    /// Opens (or creates) the audit file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &AuditEvent) {
        // Serialization of the event types cannot fail; write errors are
        // swallowed because audit must never fail the operation.
        let Ok(mut line) = serde_json::to_string(event) else {
            return;
        };
        line.push('\n');
        if let Ok(mut guard) = self.file.lock() {
            let _ = guard.write_all(line.as_bytes());
        }
    }
}
