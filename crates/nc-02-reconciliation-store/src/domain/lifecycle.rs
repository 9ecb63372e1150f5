//! # Record Lifecycle
//!
//! | Current     | Event                 | Next        |
//! |-------------|-----------------------|-------------|
//! | `pending`   | `SubmissionConfirmed` | `confirmed` |
//! | `pending`   | `SubmissionFailed`    | `failed`    |
//! | `pending`   | `SubmissionResumed`   | `pending`   |
//! | `failed`    | `RetryRequested`      | `pending`   |
//! | `confirmed` | `VerificationFailed`  | `failed`    |
//!
//! Everything else is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission status of a reconciliation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Created, fingerprint not yet on the ledger.
    Pending,
    /// Fingerprint accepted by the ledger.
    Confirmed,
    /// Submission failed, or a later verification found it missing.
    Failed,
}

impl RecordStatus {
    /// Lowercase name as stored in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEvent {
    /// The ledger accepted the submission.
    SubmissionConfirmed,
    /// The submission errored.
    SubmissionFailed,
    /// A failed record is being submitted again.
    RetryRequested,
    /// A pending record left by an interrupted pass is being submitted again.
    SubmissionResumed,
    /// The ledger no longer reports the fingerprint.
    VerificationFailed,
}

/// A transition not in the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event:?} to a {from} record")]
pub struct TransitionRejected {
    /// Status the record was in.
    pub from: RecordStatus,
    /// Event that was refused.
    pub event: RecordEvent,
}

/// Applies `event` to `current`.
///
/// # Errors
///
/// Returns [`TransitionRejected`] for any pair outside the lifecycle table.
pub fn transition(
    current: RecordStatus,
    event: RecordEvent,
) -> Result<RecordStatus, TransitionRejected> {
    use RecordEvent::*;
    use RecordStatus::*;

    match (current, event) {
        (Pending, SubmissionConfirmed) => Ok(Confirmed),
        (Pending, SubmissionFailed) => Ok(Failed),
        (Pending, SubmissionResumed) => Ok(Pending),
        (Failed, RetryRequested) => Ok(Pending),
        (Confirmed, VerificationFailed) => Ok(Failed),
        (from, event) => Err(TransitionRejected { from, event }),
    }
}
