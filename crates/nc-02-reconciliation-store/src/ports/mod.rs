//! # Ports
//!
//! The store is driven by the sync orchestrator and the operator CLI; the
//! registry additionally backs contract resolution in the ledger client.

use crate::domain::{NewRecord, ReconciliationRecord, SortOrder, StoreError};
use async_trait::async_trait;
use shared_types::{Address, ContractHandle, TxHash};
use uuid::Uuid;

/// Persistence for reconciliation records.
///
/// Every write is atomic: either the whole change is visible or none of it.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// The confirmed record for a complaint, if any.
    async fn find_confirmed(
        &self,
        complaint_id: &str,
    ) -> Result<Option<ReconciliationRecord>, StoreError>;

    /// The pending or failed record for a complaint, if any.
    async fn find_pending_or_failed(
        &self,
        complaint_id: &str,
    ) -> Result<Option<ReconciliationRecord>, StoreError>;

    /// Inserts a new `pending` record.
    ///
    /// ## Errors
    ///
    /// - `DuplicateRecord`: the complaint is already tracked
    async fn create(&self, new: NewRecord) -> Result<ReconciliationRecord, StoreError>;

    /// `pending -> confirmed`.
    ///
    /// ## Errors
    ///
    /// - `RecordNotFound`
    /// - `InvalidTransition`: record is not pending
    /// - `DuplicateConfirmed`: another record for the complaint is confirmed
    async fn mark_confirmed(&self, record_id: Uuid, tx: TxHash) -> Result<(), StoreError>;

    /// `pending -> failed` after a submission error.
    async fn mark_failed(&self, record_id: Uuid, message: &str) -> Result<(), StoreError>;

    /// `confirmed -> failed` when the ledger no longer reports the fingerprint.
    async fn mark_verification_failed(
        &self,
        record_id: Uuid,
        message: &str,
    ) -> Result<(), StoreError>;

    /// `failed -> pending`, retargeting the contract and signer.
    async fn reset_for_retry(
        &self,
        record_id: Uuid,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<ReconciliationRecord, StoreError>;

    /// `pending -> pending`, retargeting a record left by an interrupted pass
    /// at the current contract and signer.
    async fn resume_pending(
        &self,
        record_id: Uuid,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<ReconciliationRecord, StoreError>;

    /// All confirmed records, newest first.
    async fn list_confirmed(&self) -> Result<Vec<ReconciliationRecord>, StoreError>;

    /// Every record in the requested order.
    async fn list_all(&self, order: SortOrder) -> Result<Vec<ReconciliationRecord>, StoreError>;

    /// Looks a record up by id.
    async fn get(&self, record_id: Uuid) -> Result<Option<ReconciliationRecord>, StoreError>;
}

/// Registry of deployed fingerprint-registry contracts.
#[async_trait]
pub trait ContractRegistry: Send + Sync {
    /// Records a handle. Recording an active handle deactivates every other
    /// one in the same write.
    ///
    /// ## Errors
    ///
    /// - `ContractExists`: address already registered
    async fn record(&self, handle: ContractHandle) -> Result<(), StoreError>;

    /// The most recently deployed active handle.
    async fn latest_active(&self) -> Result<Option<ContractHandle>, StoreError>;

    /// Every handle, newest first.
    async fn list(&self) -> Result<Vec<ContractHandle>, StoreError>;

    /// Flips the activation flag. Activating a handle deactivates every
    /// other one in the same write.
    async fn set_active(&self, address: Address, active: bool) -> Result<(), StoreError>;
}

/// Newest-first ordering for handles.
pub(crate) fn sort_handles(handles: &mut [ContractHandle]) {
    handles.sort_by(|a, b| {
        b.deployed_at
            .cmp(&a.deployed_at)
            .then(b.address.cmp(&a.address))
    });
}
