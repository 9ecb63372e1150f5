//! In-memory store. One `RwLock` guards all three tables, so each write is
//! applied under a single lock acquisition.

use crate::domain::entities::sort_records;
use crate::domain::{NewRecord, ReconciliationRecord, RecordStatus, SortOrder, StoreError};
use crate::ports::{sort_handles, ContractRegistry, ReconciliationStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, ContractHandle, TxHash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    records: HashMap<Uuid, ReconciliationRecord>,
    complaint_index: HashMap<String, Uuid>,
    contracts: HashMap<Address, ContractHandle>,
}

/// Store and registry held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `PersistenceUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::PersistenceUnavailable(
                "in-memory store marked unavailable".into(),
            ));
        }
        Ok(())
    }

    fn by_complaint(&self, complaint_id: &str) -> Result<Option<ReconciliationRecord>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();
        Ok(tables
            .complaint_index
            .get(complaint_id)
            .and_then(|id| tables.records.get(id))
            .cloned())
    }

    fn update<F>(&self, record_id: Uuid, mutate: F) -> Result<ReconciliationRecord, StoreError>
    where
        F: FnOnce(&Tables, &mut ReconciliationRecord) -> Result<(), StoreError>,
    {
        self.check_available()?;
        let mut tables = self.tables.write();
        let mut record = tables
            .records
            .get(&record_id)
            .cloned()
            .ok_or(StoreError::RecordNotFound(record_id))?;
        mutate(&tables, &mut record)?;
        tables.records.insert(record_id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ReconciliationStore for InMemoryStore {
    async fn find_confirmed(
        &self,
        complaint_id: &str,
    ) -> Result<Option<ReconciliationRecord>, StoreError> {
        Ok(self
            .by_complaint(complaint_id)?
            .filter(|r| r.status == RecordStatus::Confirmed))
    }

    async fn find_pending_or_failed(
        &self,
        complaint_id: &str,
    ) -> Result<Option<ReconciliationRecord>, StoreError> {
        Ok(self
            .by_complaint(complaint_id)?
            .filter(|r| r.status != RecordStatus::Confirmed))
    }

    async fn create(&self, new: NewRecord) -> Result<ReconciliationRecord, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if let Some(existing) = tables.complaint_index.get(&new.complaint_id) {
            return Err(StoreError::DuplicateRecord {
                complaint_id: new.complaint_id,
                existing: *existing,
            });
        }
        let record = ReconciliationRecord::from_new(new);
        tables
            .complaint_index
            .insert(record.complaint_id.clone(), record.id);
        tables.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn mark_confirmed(&self, record_id: Uuid, tx: TxHash) -> Result<(), StoreError> {
        self.update(record_id, |tables, record| {
            let already = tables.records.values().any(|other| {
                other.id != record.id
                    && other.complaint_id == record.complaint_id
                    && other.status == RecordStatus::Confirmed
            });
            if already {
                return Err(StoreError::DuplicateConfirmed(record.complaint_id.clone()));
            }
            record
                .confirm(tx)
                .map_err(|e| StoreError::transition(record_id, e))
        })
        .map(|_| ())
    }

    async fn mark_failed(&self, record_id: Uuid, message: &str) -> Result<(), StoreError> {
        self.update(record_id, |_, record| {
            record
                .fail_submission(message)
                .map_err(|e| StoreError::transition(record_id, e))
        })
        .map(|_| ())
    }

    async fn mark_verification_failed(
        &self,
        record_id: Uuid,
        message: &str,
    ) -> Result<(), StoreError> {
        self.update(record_id, |_, record| {
            record
                .fail_verification(message)
                .map_err(|e| StoreError::transition(record_id, e))
        })
        .map(|_| ())
    }

    async fn reset_for_retry(
        &self,
        record_id: Uuid,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<ReconciliationRecord, StoreError> {
        self.update(record_id, |_, record| {
            record
                .reset_for_retry(ledger_address, submitter)
                .map_err(|e| StoreError::transition(record_id, e))
        })
    }

    async fn resume_pending(
        &self,
        record_id: Uuid,
        ledger_address: Address,
        submitter: Address,
    ) -> Result<ReconciliationRecord, StoreError> {
        self.update(record_id, |_, record| {
            record
                .resume(ledger_address, submitter)
                .map_err(|e| StoreError::transition(record_id, e))
        })
    }

    async fn list_confirmed(&self) -> Result<Vec<ReconciliationRecord>, StoreError> {
        let mut records = self.list_all(SortOrder::Newest).await?;
        records.retain(|r| r.status == RecordStatus::Confirmed);
        Ok(records)
    }

    async fn list_all(&self, order: SortOrder) -> Result<Vec<ReconciliationRecord>, StoreError> {
        self.check_available()?;
        let mut records: Vec<_> = self.tables.read().records.values().cloned().collect();
        sort_records(&mut records, order);
        Ok(records)
    }

    async fn get(&self, record_id: Uuid) -> Result<Option<ReconciliationRecord>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().records.get(&record_id).cloned())
    }
}

#[async_trait]
impl ContractRegistry for InMemoryStore {
    async fn record(&self, handle: ContractHandle) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.contracts.contains_key(&handle.address) {
            return Err(StoreError::ContractExists(handle.address));
        }
        if handle.is_active {
            deactivate_all(&mut tables.contracts);
        }
        tables.contracts.insert(handle.address, handle);
        Ok(())
    }

    async fn latest_active(&self) -> Result<Option<ContractHandle>, StoreError> {
        Ok(self.list().await?.into_iter().find(|h| h.is_active))
    }

    async fn list(&self) -> Result<Vec<ContractHandle>, StoreError> {
        self.check_available()?;
        let mut handles: Vec<_> = self.tables.read().contracts.values().cloned().collect();
        sort_handles(&mut handles);
        Ok(handles)
    }

    async fn set_active(&self, address: Address, active: bool) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if !tables.contracts.contains_key(&address) {
            return Err(StoreError::ContractNotFound(address));
        }
        if active {
            deactivate_all(&mut tables.contracts);
        }
        if let Some(handle) = tables.contracts.get_mut(&address) {
            handle.is_active = active;
        }
        Ok(())
    }
}

fn deactivate_all(contracts: &mut HashMap<Address, ContractHandle>) {
    for handle in contracts.values_mut() {
        handle.is_active = false;
    }
}
