// crates/formwell-core/src/core/submission.rs
// ============================================================================
// Module: Formwell Submissions
// Description: Submitted value snapshots with lifecycle and artifact info.
// Purpose: Preserve raw submissions verbatim with tamper-evident artifacts.
// Dependencies: crate::core::{hashing, identifiers, language, time}, serde
// ============================================================================

//! ## Overview
//! A submission stores the raw submitted value map verbatim as a snapshot
//! so historical documents stay faithful even when the owning definition
//! later changes. Once a document artifact is produced, the submission
//! records its storage location and content hash and advances to Completed;
//! it is never mutated afterwards except by explicit correction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::FormId;
use crate::core::identifiers::FormVersion;
use crate::core::identifiers::PatientId;
use crate::core::identifiers::SubmissionId;
use crate::core::language::Language;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Submission lifecycle status.
///
/// # Invariants
/// - Submitted advances to Completed or Failed, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Received and canonicalized; no document produced yet.
    Submitted,
    /// Document artifact produced and hashed.
    Completed,
    /// Document production failed; the error is recorded.
    Failed,
}

impl SubmissionStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

// ============================================================================
// SECTION: Artifact Info
// ============================================================================

/// Location and tamper evidence of a produced document artifact.
///
/// # Invariants
/// - `content_hash` must match the artifact bytes at `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// Opaque storage location of the artifact bytes.
    pub location: String,
    /// Content hash of the artifact bytes.
    pub content_hash: HashDigest,
}

// ============================================================================
// SECTION: Submission Record
// ============================================================================

/// Stored submission with its raw value snapshot.
///
/// # Invariants
/// - `values` is the submitted map verbatim; canonicalization never edits it.
/// - `artifact` is `Some` exactly when `status` is Completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Owning form definition.
    pub form_id: FormId,
    /// Definition version at submission time.
    pub form_version: FormVersion,
    /// Resolved patient record.
    pub patient_id: PatientId,
    /// Raw submitted value map, preserved verbatim.
    pub values: BTreeMap<String, Value>,
    /// Language the form was filled in.
    pub language: Language,
    /// Submission timestamp.
    pub submitted_at: Timestamp,
    /// Lifecycle status.
    pub status: SubmissionStatus,
    /// Artifact location and hash once a document is produced.
    pub artifact: Option<ArtifactInfo>,
    /// Recorded error when document production failed.
    pub error: Option<String>,
}

impl Submission {
    /// Returns true once a document artifact has been produced.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, SubmissionStatus::Completed)
    }
}
