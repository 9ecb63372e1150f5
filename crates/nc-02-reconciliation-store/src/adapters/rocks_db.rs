//! # RocksDB Store Adapter
//!
//! Embedded production store for reconciliation records and contract handles.
//!
//! ## Column Families
//!
//! - `records` - record id (16 bytes) -> JSON record document
//! - `complaint_index` - complaint id (UTF-8) -> record id
//! - `contracts` - contract address (20 bytes) -> JSON handle document
//!
//! ## Atomicity
//!
//! Each mutation builds a single `WriteBatch` while holding the write lock,
//! so the uniqueness check and the write cannot interleave with another
//! writer in this process.

use crate::domain::entities::sort_records;
use crate::domain::{NewRecord, ReconciliationRecord, RecordStatus, SortOrder, StoreError};
use crate::ports::{sort_handles, ContractRegistry, ReconciliationStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use shared_types::{Address, ContractHandle, TxHash};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Column family names
pub const CF_RECORDS: &str = "records";
pub const CF_COMPLAINT_INDEX: &str = "complaint_index";
pub const CF_CONTRACTS: &str = "contracts";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[CF_RECORDS, CF_COMPLAINT_INDEX, CF_CONTRACTS];

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 32MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/ledger-sync".to_string(),
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config rooted at `path` with production defaults.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed reconciliation store and contract registry.
pub struct RocksDbStore {
    db: RwLock<DB>,
    config: RocksDbConfig,
}

fn io_err(op: &str, e: rocksdb::Error) -> StoreError {
    StoreError::PersistenceUnavailable(format!("RocksDB {op} failed: {e}"))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Corrupted(e.to_string()))
}

impl RocksDbStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| io_err("open", e))?;
        info!(path = %config.path, "Opened reconciliation store");

        Ok(Self {
            db: RwLock::new(db),
            config,
        })
    }

    fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StoreError> {
        db.cf_handle(name)
            .ok_or_else(|| StoreError::Corrupted(format!("missing column family {name}")))
    }

    fn write(&self, db: &DB, batch: WriteBatch) -> Result<(), StoreError> {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        db.write_opt(batch, &write_opts)
            .map_err(|e| io_err("batch write", e))
    }

    fn read_record(db: &DB, record_id: Uuid) -> Result<Option<ReconciliationRecord>, StoreError> {
        let cf = Self::cf(db, CF_RECORDS)?;
        db.get_cf(cf, record_id.as_bytes())
            .map_err(|e| io_err("get", e))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn indexed_record_id(db: &DB, complaint_id: &str) -> Result<Option<Uuid>, StoreError> {
        let cf = Self::cf(db, CF_COMPLAINT_INDEX)?;
        db.get_cf(cf, complaint_id.as_bytes())
            .map_err(|e| io_err("get", e))?
            .map(|bytes| {
                Uuid::from_slice(&bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
            })
            .transpose()
    }

    fn by_complaint(&self, complaint_id: &str) -> Result<Option<ReconciliationRecord>, StoreError> {
        let db = self.db.read();
        match Self::indexed_record_id(&db, complaint_id)? {
            Some(id) => Self::read_record(&db, id),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(db: &DB, cf_name: &str) -> Result<Vec<T>, StoreError> {
        let cf = Self::cf(db, cf_name)?;
        let mut results = Vec::new();
        for item in db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| io_err("scan", e))?;
            results.push(decode(&value)?);
        }
        Ok(results)
    }

    /// Stages the deactivation of every active handle except `keep`.
    fn deactivate_others(
        db: &DB,
        batch: &mut WriteBatch,
        keep: Address,
    ) -> Result<(), StoreError> {
        let cf = Self::cf(db, CF_CONTRACTS)?;
        let handles: Vec<ContractHandle> = Self::scan(db, CF_CONTRACTS)?;
        for mut handle in handles {
            if handle.is_active && handle.address != keep {
                handle.is_active = false;
                batch.put_cf(cf, handle.address.as_bytes(), encode(&handle)?);
            }
        }
        Ok(())
    }

    /// Read-modify-write of one record under the write lock.
    fn update<F>(&self, record_id: Uuid, mutate: F) -> Result<ReconciliationRecord, StoreError>
    where
        F: FnOnce(&DB, &mut ReconciliationRecord) -> Result<(), StoreError>,
    {
        let db = self.db.write();
        let mut record =
            Self::read_record(&db, record_id)?.ok_or(StoreError::RecordNotFound(record_id))?;
        mutate(&db, &mut record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(Self::cf(&db, CF_RECORDS)?, record_id.as_bytes(), encode(&record)?);
        self.write(&db, batch)?;
        debug!(record_id = %record_id, status = %record.status, "Updated record");
        Ok(record)
    }
}

#[async_trait]
impl ReconciliationStore for RocksDbStore {
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
        let db = self.db.write();
        if let Some(existing) = Self::indexed_record_id(&db, &new.complaint_id)? {
            return Err(StoreError::DuplicateRecord {
                complaint_id: new.complaint_id,
                existing,
            });
        }

        let record = ReconciliationRecord::from_new(new);
        let mut batch = WriteBatch::default();
        batch.put_cf(
            Self::cf(&db, CF_RECORDS)?,
            record.id.as_bytes(),
            encode(&record)?,
        );
        batch.put_cf(
            Self::cf(&db, CF_COMPLAINT_INDEX)?,
            record.complaint_id.as_bytes(),
            record.id.as_bytes(),
        );
        self.write(&db, batch)?;
        Ok(record)
    }

    async fn mark_confirmed(&self, record_id: Uuid, tx: TxHash) -> Result<(), StoreError> {
        self.update(record_id, |db, record| {
            // The index holds one record per complaint; anything else confirmed
            // for this complaint means the index and records disagree.
            let indexed = Self::indexed_record_id(db, &record.complaint_id)?;
            if let Some(other) = indexed.filter(|id| *id != record.id) {
                if Self::read_record(db, other)?
                    .is_some_and(|r| r.status == RecordStatus::Confirmed)
                {
                    return Err(StoreError::DuplicateConfirmed(record.complaint_id.clone()));
                }
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
        let mut records: Vec<ReconciliationRecord> = {
            let db = self.db.read();
            Self::scan(&db, CF_RECORDS)?
        };
        sort_records(&mut records, order);
        Ok(records)
    }

    async fn get(&self, record_id: Uuid) -> Result<Option<ReconciliationRecord>, StoreError> {
        let db = self.db.read();
        Self::read_record(&db, record_id)
    }
}

#[async_trait]
impl ContractRegistry for RocksDbStore {
    async fn record(&self, handle: ContractHandle) -> Result<(), StoreError> {
        let db = self.db.write();
        let cf = Self::cf(&db, CF_CONTRACTS)?;
        let key = handle.address.as_bytes();
        if db
            .get_pinned_cf(cf, key)
            .map_err(|e| io_err("get", e))?
            .is_some()
        {
            return Err(StoreError::ContractExists(handle.address));
        }
        let mut batch = WriteBatch::default();
        if handle.is_active {
            Self::deactivate_others(&db, &mut batch, handle.address)?;
        }
        batch.put_cf(cf, key, encode(&handle)?);
        self.write(&db, batch)
    }

    async fn latest_active(&self) -> Result<Option<ContractHandle>, StoreError> {
        Ok(self.list().await?.into_iter().find(|h| h.is_active))
    }

    async fn list(&self) -> Result<Vec<ContractHandle>, StoreError> {
        let mut handles: Vec<ContractHandle> = {
            let db = self.db.read();
            Self::scan(&db, CF_CONTRACTS)?
        };
        sort_handles(&mut handles);
        Ok(handles)
    }

    async fn set_active(&self, address: Address, active: bool) -> Result<(), StoreError> {
        let db = self.db.write();
        let cf = Self::cf(&db, CF_CONTRACTS)?;
        let mut handle: ContractHandle = db
            .get_cf(cf, address.as_bytes())
            .map_err(|e| io_err("get", e))?
            .map(|bytes| decode(&bytes))
            .transpose()?
            .ok_or(StoreError::ContractNotFound(address))?;
        handle.is_active = active;

        let mut batch = WriteBatch::default();
        if active {
            Self::deactivate_others(&db, &mut batch, address)?;
        }
        batch.put_cf(cf, address.as_bytes(), encode(&handle)?);
        self.write(&db, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared_types::{ComplaintRecord, Fingerprint};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> RocksDbStore {
        RocksDbStore::open(RocksDbConfig::for_testing(
            dir.path().to_string_lossy().to_string(),
        ))
        .unwrap()
    }

    fn new_record(complaint_id: &str) -> NewRecord {
        NewRecord {
            complaint_id: complaint_id.into(),
            fingerprint: Fingerprint::new([4; 32]),
            ledger_address: Address::new([1; 20]),
            submitter: Address::new([2; 20]),
            complaint_data: ComplaintRecord::new(complaint_id, "text")
                .with_legal_sections(["IPC 379"]),
        }
    }

    #[tokio::test]
    async fn test_rocksdb_record_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let record = store.create(new_record("c1")).await.unwrap();
        assert_eq!(store.get(record.id).await.unwrap(), Some(record.clone()));

        let resumed = store
            .resume_pending(record.id, Address::new([3; 20]), Address::new([5; 20]))
            .await
            .unwrap();
        assert_eq!(resumed.wallet_used, Address::new([5; 20]));

        store.mark_failed(record.id, "timeout").await.unwrap();
        store
            .reset_for_retry(record.id, Address::new([7; 20]), Address::new([2; 20]))
            .await
            .unwrap();
        store
            .mark_confirmed(record.id, TxHash::new("0xabc"))
            .await
            .unwrap();

        let confirmed = store.find_confirmed("c1").await.unwrap().unwrap();
        assert_eq!(confirmed.contract_address, Address::new([7; 20]));
        assert_eq!(confirmed.complaint_data.legal_sections(), ["IPC 379".to_string()]);
        assert!(confirmed.error_message.is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_duplicate_record_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.create(new_record("c1")).await.unwrap();
        assert!(matches!(
            store.create(new_record("c1")).await,
            Err(StoreError::DuplicateRecord { .. })
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_rejected_transition_is_not_written() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let record = store.create(new_record("c1")).await.unwrap();

        let err = store
            .mark_verification_failed(record.id, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(
            store.get(record.id).await.unwrap().unwrap().status,
            RecordStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_rocksdb_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = open(&dir);
            let record = store.create(new_record("c1")).await.unwrap();
            store
                .mark_confirmed(record.id, TxHash::new("0x1"))
                .await
                .unwrap();
            store
                .record(ContractHandle::new_active(
                    Address::new([9; 20]),
                    "deployer",
                    TxHash::new(TxHash::MANUAL),
                ))
                .await
                .unwrap();
            record.id
        };

        let store = open(&dir);
        let listed = store.list_confirmed().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        let handle = store.latest_active().await.unwrap().unwrap();
        assert_eq!(handle.transaction_hash.as_str(), "manually-recorded");
    }

    #[tokio::test]
    async fn test_rocksdb_list_all_ordering() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        for id in ["a", "b", "c"] {
            store.create(new_record(id)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let newest: Vec<_> = store
            .list_all(SortOrder::Newest)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.complaint_id)
            .collect();
        assert_eq!(newest, vec!["c", "b", "a"]);
        let oldest = store.list_all(SortOrder::Oldest).await.unwrap();
        assert_eq!(oldest[0].complaint_id, "a");
    }

    #[tokio::test]
    async fn test_rocksdb_registry() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let mut old = ContractHandle::new_active(Address::new([1; 20]), "d", TxHash::new("0xa"));
        old.deployed_at = Utc::now() - Duration::hours(1);
        let new = ContractHandle::new_active(Address::new([2; 20]), "d", TxHash::new("0xb"));
        store.record(old.clone()).await.unwrap();
        store.record(new.clone()).await.unwrap();

        assert_eq!(
            store.latest_active().await.unwrap().map(|h| h.address),
            Some(new.address)
        );
        assert!(matches!(
            store.record(old.clone()).await,
            Err(StoreError::ContractExists(_))
        ));

        store.set_active(new.address, false).await.unwrap();
        assert!(store.latest_active().await.unwrap().is_none());

        store.set_active(old.address, true).await.unwrap();
        assert_eq!(
            store.latest_active().await.unwrap().map(|h| h.address),
            Some(old.address)
        );
        store.set_active(new.address, true).await.unwrap();
        let active: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|h| h.is_active)
            .map(|h| h.address)
            .collect();
        assert_eq!(active, vec![new.address]);
        assert!(matches!(
            store.set_active(Address::new([3; 20]), true).await,
            Err(StoreError::ContractNotFound(_))
        ));
    }
}
