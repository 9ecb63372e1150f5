//! # Pass Outcomes
//!
//! Every complaint touched by a pass yields one `ComplaintOutcome`. The
//! report groups them by phase and `SyncSummary` counts them by kind.

use nc_02_reconciliation_store::ReconciliationRecord;
use shared_types::{Address, Fingerprint, TxHash};
use std::fmt;

/// What happened to one complaint during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Fingerprint submitted and confirmed.
    Success,
    /// A confirmed record already existed; nothing submitted.
    AlreadyProcessed,
    /// Hashing or submission failed.
    Failed,
    /// The ledger still holds the confirmed fingerprint.
    Verified,
    /// The ledger no longer holds the fingerprint; record moved to `failed`.
    VerificationFailed,
    /// The ledger could not be queried; record left untouched.
    VerificationError,
}

impl OutcomeKind {
    /// Stable kebab-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AlreadyProcessed => "already-processed",
            Self::Failed => "failed",
            Self::Verified => "verified",
            Self::VerificationFailed => "verification-failed",
            Self::VerificationError => "verification-error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-complaint result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintOutcome {
    /// Complaint identifier.
    pub complaint_id: String,
    /// Outcome kind.
    pub kind: OutcomeKind,
    /// Fingerprint, absent when hashing failed.
    pub fingerprint: Option<Fingerprint>,
    /// Ledger transaction, when one exists.
    pub transaction_hash: Option<TxHash>,
    /// Error text for failure kinds.
    pub message: Option<String>,
}

impl ComplaintOutcome {
    fn from_record(record: &ReconciliationRecord, kind: OutcomeKind) -> Self {
        Self {
            complaint_id: record.complaint_id.clone(),
            kind,
            fingerprint: Some(record.fingerprint),
            transaction_hash: record.transaction_hash.clone(),
            message: None,
        }
    }

    /// Submission confirmed.
    pub fn success(complaint_id: impl Into<String>, fingerprint: Fingerprint, tx: TxHash) -> Self {
        Self {
            complaint_id: complaint_id.into(),
            kind: OutcomeKind::Success,
            fingerprint: Some(fingerprint),
            transaction_hash: Some(tx),
            message: None,
        }
    }

    /// Skipped because a confirmed record exists.
    #[must_use]
    pub fn already_processed(record: &ReconciliationRecord) -> Self {
        Self::from_record(record, OutcomeKind::AlreadyProcessed)
    }

    /// Hashing or submission failed.
    pub fn failed(
        complaint_id: impl Into<String>,
        fingerprint: Option<Fingerprint>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            complaint_id: complaint_id.into(),
            kind: OutcomeKind::Failed,
            fingerprint,
            transaction_hash: None,
            message: Some(message.into()),
        }
    }

    /// Fingerprint still present on the ledger.
    #[must_use]
    pub fn verified(record: &ReconciliationRecord) -> Self {
        Self::from_record(record, OutcomeKind::Verified)
    }

    /// Fingerprint missing from the ledger.
    #[must_use]
    pub fn verification_failed(record: &ReconciliationRecord, message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::from_record(record, OutcomeKind::VerificationFailed)
        }
    }

    /// Ledger query failed during verification.
    #[must_use]
    pub fn verification_error(record: &ReconciliationRecord, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::from_record(record, OutcomeKind::VerificationError)
        }
    }
}

/// Counts per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Confirmed submissions.
    pub success: usize,
    /// Complaints skipped as already confirmed.
    pub already_processed: usize,
    /// Failed complaints.
    pub failed: usize,
    /// Confirmed records still on the ledger.
    pub verified: usize,
    /// Confirmed records missing from the ledger.
    pub verification_failed: usize,
    /// Confirmed records that could not be checked.
    pub verification_error: usize,
}

impl SyncSummary {
    /// Counts outcomes by kind.
    pub fn tally<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a ComplaintOutcome>,
    {
        let mut summary = Self::default();
        for outcome in outcomes {
            let slot = match outcome.kind {
                OutcomeKind::Success => &mut summary.success,
                OutcomeKind::AlreadyProcessed => &mut summary.already_processed,
                OutcomeKind::Failed => &mut summary.failed,
                OutcomeKind::Verified => &mut summary.verified,
                OutcomeKind::VerificationFailed => &mut summary.verification_failed,
                OutcomeKind::VerificationError => &mut summary.verification_error,
            };
            *slot += 1;
        }
        summary
    }

    /// Number of submission-phase outcomes.
    #[must_use]
    pub fn submissions(&self) -> usize {
        self.success + self.already_processed + self.failed
    }

    /// Number of verification-phase outcomes.
    #[must_use]
    pub fn verifications(&self) -> usize {
        self.verified + self.verification_failed + self.verification_error
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "success={} already-processed={} failed={} verified={} verification-failed={} verification-error={}",
            self.success,
            self.already_processed,
            self.failed,
            self.verified,
            self.verification_failed,
            self.verification_error
        )
    }
}

/// Result of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Contract submissions went to. Absent for verification-only runs.
    pub contract: Option<Address>,
    /// Identity that signed. Absent for verification-only runs.
    pub signer: Option<Address>,
    /// Submission-phase outcomes, in backlog order.
    pub submissions: Vec<ComplaintOutcome>,
    /// Verification-phase outcomes.
    pub verifications: Vec<ComplaintOutcome>,
}

impl SyncReport {
    /// Counts across both phases.
    #[must_use]
    pub fn summary(&self) -> SyncSummary {
        SyncSummary::tally(self.submissions.iter().chain(self.verifications.iter()))
    }

    /// Outcomes of the given kind.
    pub fn of_kind(&self, kind: OutcomeKind) -> impl Iterator<Item = &ComplaintOutcome> {
        self.submissions
            .iter()
            .chain(self.verifications.iter())
            .filter(move |o| o.kind == kind)
    }
}
