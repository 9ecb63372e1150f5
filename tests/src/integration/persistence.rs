//! # Full Stack Flows
//!
//! RocksDB store, ledger service over the simulated runtime, and a complaint
//! export on disk. Checks that state survives a restart of the tool.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use nc_01_canonical_hasher::fingerprint;
    use nc_02_reconciliation_store::{
        ContractRegistry, RecordStatus, ReconciliationStore, RocksDbConfig, RocksDbStore,
    };
    use nc_03_ledger_client::{FingerprintEncoding, InMemoryLedger, LedgerConfig, LedgerService};
    use nc_04_sync_orchestrator::{JsonFileSource, OutcomeKind, SyncConfig, SyncOrchestrator};
    use shared_types::ComplaintRecord;
    use tempfile::TempDir;

    use crate::integration::fixtures::{complaint, reference_complaint, REFERENCE_FINGERPRINT};

    type Stack = SyncOrchestrator<
        RocksDbStore,
        LedgerService<InMemoryLedger, RocksDbStore>,
        JsonFileSource,
    >;

    fn write_export(dir: &Path, complaints: &[ComplaintRecord]) -> std::path::PathBuf {
        let path = dir.join("complaints.json");
        std::fs::write(&path, serde_json::to_vec(complaints).unwrap()).unwrap();
        path
    }

    fn stack(
        db_path: &Path,
        export: &Path,
        chain: Arc<InMemoryLedger>,
        encoding: FingerprintEncoding,
    ) -> (Arc<RocksDbStore>, Stack) {
        let store = Arc::new(
            RocksDbStore::open(RocksDbConfig::for_testing(db_path.to_string_lossy())).unwrap(),
        );
        let ledger = LedgerService::new(
            chain,
            store.clone(),
            InMemoryLedger::artifact(encoding),
            LedgerConfig {
                timeout: Duration::from_secs(2),
                receipt_poll_interval: Duration::from_millis(5),
                ..LedgerConfig::default()
            },
        );
        let orchestrator = SyncOrchestrator::new(
            store.clone(),
            Arc::new(ledger),
            Arc::new(JsonFileSource::new(export)),
            SyncConfig {
                auto_deploy: true,
                wallet: None,
            },
        );
        (store, orchestrator)
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("db");
        let export = write_export(dir.path(), &[reference_complaint(), complaint("c2")]);
        let chain = Arc::new(InMemoryLedger::new());

        let contract = {
            let (_store, orchestrator) =
                stack(&db_path, &export, chain.clone(), FingerprintEncoding::Bytes32);
            let report = orchestrator.run_pass().await.unwrap();
            assert_eq!(report.summary().success, 2);
            assert_eq!(report.summary().verified, 2);
            report.contract.unwrap()
        };

        let (store, orchestrator) =
            stack(&db_path, &export, chain.clone(), FingerprintEncoding::Bytes32);
        let report = orchestrator.run_pass().await.unwrap();
        assert_eq!(report.contract, Some(contract));
        assert_eq!(report.summary().already_processed, 2);
        assert_eq!(report.summary().verified, 2);
        assert_eq!(chain.store_calls(), 2);

        let record = store.find_confirmed("abc123").await.unwrap().unwrap();
        assert_eq!(record.fingerprint.to_hex(), REFERENCE_FINGERPRINT);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_string_encoded_registry() {
        let dir = TempDir::new().unwrap();
        let export = write_export(dir.path(), &[complaint("c1")]);
        let chain = Arc::new(InMemoryLedger::new());
        let (store, orchestrator) = stack(
            &dir.path().join("db"),
            &export,
            chain.clone(),
            FingerprintEncoding::String,
        );

        let report = orchestrator.run_pass().await.unwrap();
        assert_eq!(report.summary().verified, 1);

        let fp = fingerprint(&complaint("c1")).unwrap();
        assert_eq!(chain.stored_fingerprints(report.contract.unwrap()), vec![fp]);
        assert!(store.find_confirmed("c1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ledger_reset_is_detected_and_repaired() {
        let dir = TempDir::new().unwrap();
        let export = write_export(dir.path(), &[complaint("c1")]);
        let chain = Arc::new(InMemoryLedger::new());
        let (store, orchestrator) = stack(
            &dir.path().join("db"),
            &export,
            chain.clone(),
            FingerprintEncoding::Bytes32,
        );

        let contract = orchestrator.run_pass().await.unwrap().contract.unwrap();
        let fp = fingerprint(&complaint("c1")).unwrap();
        chain.forget_fingerprint(contract, &fp);

        let verification = orchestrator.verify_confirmed().await.unwrap();
        assert_eq!(
            verification.verifications[0].kind,
            OutcomeKind::VerificationFailed
        );
        let failed = store.find_pending_or_failed("c1").await.unwrap().unwrap();
        assert_eq!(failed.status, RecordStatus::Failed);

        let repaired = orchestrator.run_pass().await.unwrap();
        assert_eq!(repaired.submissions[0].kind, OutcomeKind::Success);
        assert_eq!(repaired.verifications[0].kind, OutcomeKind::Verified);
        assert!(chain.stored_fingerprints(contract).contains(&fp));
    }

    #[tokio::test]
    async fn test_missing_export_aborts_before_submitting() {
        let dir = TempDir::new().unwrap();
        let chain = Arc::new(InMemoryLedger::new());
        let (_store, orchestrator) = stack(
            &dir.path().join("db"),
            &dir.path().join("absent.json"),
            chain.clone(),
            FingerprintEncoding::Bytes32,
        );

        assert!(matches!(
            orchestrator.run_pass().await,
            Err(nc_04_sync_orchestrator::SyncError::ComplaintSource(_))
        ));
        assert_eq!(chain.store_calls(), 0);
    }
}
