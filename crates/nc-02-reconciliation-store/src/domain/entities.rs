//! # Reconciliation Entities

use super::lifecycle::{transition, RecordEvent, RecordStatus, TransitionRejected};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Address, ComplaintRecord, Fingerprint, TxHash};
use uuid::Uuid;

/// Bookkeeping row tracking one complaint's submission lifecycle.
///
/// Serialized with the document field names used by the operator tooling:
/// `complaintId`, `fingerprint`, `timestamp`, `transactionHash`,
/// `contractAddress`, `complaintData`, `status`, `errorMessage`, `walletUsed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRecord {
    /// Record id.
    pub id: Uuid,
    /// Complaint this record tracks.
    pub complaint_id: String,
    /// Fingerprint computed when the record was created.
    pub fingerprint: Fingerprint,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Ledger transaction, set once confirmed.
    pub transaction_hash: Option<TxHash>,
    /// Contract the fingerprint was (or will be) submitted to.
    pub contract_address: Address,
    /// Complaint snapshot taken at creation.
    pub complaint_data: ComplaintRecord,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Last error, cleared on retry.
    pub error_message: Option<String>,
    /// Identity that signs the submission.
    pub wallet_used: Address,
}

/// Input for [`crate::ReconciliationStore::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Complaint identifier.
    pub complaint_id: String,
    /// Fingerprint to submit.
    pub fingerprint: Fingerprint,
    /// Target contract.
    pub ledger_address: Address,
    /// Signing identity.
    pub submitter: Address,
    /// Snapshot of the complaint.
    pub complaint_data: ComplaintRecord,
}

/// Ordering for [`crate::ReconciliationStore::list_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

impl ReconciliationRecord {
    /// Builds a fresh `pending` record stamped now.
    #[must_use]
    pub fn from_new(new: NewRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            complaint_id: new.complaint_id,
            fingerprint: new.fingerprint,
            timestamp: Utc::now(),
            transaction_hash: None,
            contract_address: new.ledger_address,
            complaint_data: new.complaint_data,
            status: RecordStatus::Pending,
            error_message: None,
            wallet_used: new.submitter,
        }
    }

    /// `pending -> confirmed`, remembering the transaction.
    pub fn confirm(&mut self, tx: TxHash) -> Result<(), TransitionRejected> {
        self.status = transition(self.status, RecordEvent::SubmissionConfirmed)?;
        self.transaction_hash = Some(tx);
        self.error_message = None;
        Ok(())
    }

    /// `pending -> failed`.
    pub fn fail_submission(&mut self, message: impl Into<String>) -> Result<(), TransitionRejected> {
        self.status = transition(self.status, RecordEvent::SubmissionFailed)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    /// `confirmed -> failed`. The transaction reference is kept for audit.
    pub fn fail_verification(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(), TransitionRejected> {
        self.status = transition(self.status, RecordEvent::VerificationFailed)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    /// `failed -> pending` against a possibly different contract and signer.
    pub fn reset_for_retry(
        &mut self,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<(), TransitionRejected> {
        self.status = transition(self.status, RecordEvent::RetryRequested)?;
        self.error_message = None;
        self.transaction_hash = None;
        self.contract_address = ledger_address;
        self.wallet_used = submitter;
        Ok(())
    }

    /// `pending -> pending` for a record left behind by an interrupted pass,
    /// retargeted at the contract and signer of the current pass.
    pub fn resume(
        &mut self,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<(), TransitionRejected> {
        self.status = transition(self.status, RecordEvent::SubmissionResumed)?;
        self.contract_address = ledger_address;
        self.wallet_used = submitter;
        Ok(())
    }
}

/// Sorts records in place by creation time, then id for ties.
pub fn sort_records(records: &mut [ReconciliationRecord], order: SortOrder) {
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    if order == SortOrder::Newest {
        records.reverse();
    }
}
