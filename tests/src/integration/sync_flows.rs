//! # Sync Pass Flows
//!
//! Orchestrator passes over the in-memory store against the scripted
//! ledger stub.
//!
//! ## Properties Covered
//!
//! 1. **Idempotency**: a second pass submits nothing
//! 2. **Partial failure**: one bad complaint does not stop the rest
//! 3. **Retry**: failed records are confirmed in place on the next pass
//! 3a. **Resume**: a pending record left by an interrupted pass names the
//!     wallet that actually signed its resubmission
//! 4. **Verification regression**: missing fingerprints are resubmitted
//! 5. **Zero balance**: no submissions at all
//! 6. **End to end**: the reference complaint from hash to verification

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nc_01_canonical_hasher::fingerprint;
    use nc_02_reconciliation_store::{
        InMemoryStore, NewRecord, RecordStatus, ReconciliationStore, SortOrder,
    };
    use nc_04_sync_orchestrator::{
        InMemorySource, OutcomeKind, SyncConfig, SyncError, SyncOrchestrator,
    };
    use primitive_types::U256;
    use shared_types::{Address, ComplaintRecord};

    use crate::integration::fixtures::{
        complaint, reference_complaint, StubLedger, REFERENCE_FINGERPRINT, STUB_CONTRACT,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Flow {
        store: Arc<InMemoryStore>,
        ledger: Arc<StubLedger>,
        orchestrator: SyncOrchestrator<InMemoryStore, StubLedger, InMemorySource>,
    }

    fn flow(ledger: StubLedger, backlog: Vec<ComplaintRecord>, config: SyncConfig) -> Flow {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(ledger);
        let orchestrator = SyncOrchestrator::new(
            store.clone(),
            ledger.clone(),
            Arc::new(InMemorySource::new(backlog)),
            config,
        );
        Flow {
            store,
            ledger,
            orchestrator,
        }
    }

    fn default_flow(backlog: Vec<ComplaintRecord>) -> Flow {
        flow(StubLedger::with_contract(), backlog, SyncConfig::default())
    }

    fn kinds(outcomes: &[nc_04_sync_orchestrator::ComplaintOutcome]) -> Vec<(String, OutcomeKind)> {
        outcomes
            .iter()
            .map(|o| (o.complaint_id.clone(), o.kind))
            .collect()
    }

    // =============================================================================
    // SUBMISSION FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_two_passes_leave_one_confirmed_record_per_complaint() {
        let f = default_flow(vec![complaint("c1"), complaint("c2"), complaint("c3")]);

        let first = f.orchestrator.run_pass().await.unwrap();
        assert_eq!(first.summary().success, 3);

        let second = f.orchestrator.run_pass().await.unwrap();
        assert_eq!(second.summary().already_processed, 3);
        assert_eq!(second.summary().success, 0);
        assert_eq!(f.ledger.submissions().len(), 3);

        let records = f.store.list_all(SortOrder::Oldest).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.status == RecordStatus::Confirmed));
    }

    #[tokio::test]
    async fn test_failure_of_one_complaint_does_not_stop_the_pass() {
        let c2 = complaint("c2");
        let ledger = StubLedger::with_contract();
        ledger.fail_submission(fingerprint(&c2).unwrap());
        let f = flow(
            ledger,
            vec![complaint("c1"), c2, complaint("c3")],
            SyncConfig::default(),
        );

        let report = f.orchestrator.submit_pending().await.unwrap();
        assert_eq!(
            kinds(&report.submissions),
            vec![
                ("c1".to_string(), OutcomeKind::Success),
                ("c2".to_string(), OutcomeKind::Failed),
                ("c3".to_string(), OutcomeKind::Success),
            ]
        );

        let failed = f.store.find_pending_or_failed("c2").await.unwrap().unwrap();
        assert_eq!(failed.status, RecordStatus::Failed);
        assert!(failed
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("reverted")));
    }

    #[tokio::test]
    async fn test_failed_record_is_confirmed_in_place_on_retry() {
        let c1 = complaint("c1");
        let fp = fingerprint(&c1).unwrap();
        let ledger = StubLedger::with_contract();
        ledger.fail_submission(fp);
        let f = flow(ledger, vec![c1], SyncConfig::default());

        f.orchestrator.submit_pending().await.unwrap();
        let failed = f.store.find_pending_or_failed("c1").await.unwrap().unwrap();

        f.ledger.heal();
        let retry = f.orchestrator.submit_pending().await.unwrap();
        assert_eq!(retry.submissions[0].kind, OutcomeKind::Success);

        let records = f.store.list_all(SortOrder::Newest).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, failed.id);
        assert_eq!(records[0].status, RecordStatus::Confirmed);
        assert_eq!(records[0].fingerprint, fp);
        assert!(records[0].error_message.is_none());
    }

    #[tokio::test]
    async fn test_interrupted_pending_record_credits_the_signing_wallet() {
        let wallet_a = Address::new([0x0a; 20]);
        let wallet_b = Address::new([0x0b; 20]);
        let c1 = complaint("c1");
        let fp = fingerprint(&c1).unwrap();
        let f = flow(
            StubLedger::with_contract(),
            vec![c1.clone()],
            SyncConfig {
                auto_deploy: false,
                wallet: Some(wallet_b),
            },
        );
        let interrupted = f
            .store
            .create(NewRecord {
                complaint_id: "c1".into(),
                fingerprint: fp,
                ledger_address: Address::new([0xdd; 20]),
                submitter: wallet_a,
                complaint_data: c1,
            })
            .await
            .unwrap();

        let report = f.orchestrator.submit_pending().await.unwrap();
        assert_eq!(report.signer, Some(wallet_b));
        assert_eq!(report.submissions[0].kind, OutcomeKind::Success);
        assert_eq!(f.ledger.submissions(), vec![(STUB_CONTRACT, fp, wallet_b)]);

        let record = f.store.find_confirmed("c1").await.unwrap().unwrap();
        assert_eq!(record.id, interrupted.id);
        assert_eq!(Some(record.wallet_used), report.signer);
        assert_eq!(record.contract_address, STUB_CONTRACT);
    }

    #[tokio::test]
    async fn test_zero_balance_performs_no_submissions() {
        let ledger = StubLedger::with_contract();
        ledger.set_balance(U256::zero());
        let f = flow(ledger, vec![complaint("c1"), complaint("c2")], SyncConfig::default());

        let err = f.orchestrator.run_pass().await.unwrap_err();
        assert_eq!(err, SyncError::InsufficientFunds(Address::new([0x0a; 20])));
        assert!(f.ledger.submissions().is_empty());
        assert!(f.store.list_all(SortOrder::Newest).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_deploy_when_no_contract() {
        let f = flow(
            StubLedger::new(),
            vec![complaint("c1")],
            SyncConfig {
                auto_deploy: true,
                wallet: None,
            },
        );
        let report = f.orchestrator.run_pass().await.unwrap();
        assert_eq!(report.contract, Some(STUB_CONTRACT));
        assert_eq!(report.summary().success, 1);
    }

    #[tokio::test]
    async fn test_missing_contract_without_auto_deploy() {
        let f = flow(StubLedger::new(), vec![complaint("c1")], SyncConfig::default());
        assert_eq!(
            f.orchestrator.run_pass().await.unwrap_err(),
            SyncError::NoActiveContract
        );
        assert!(f.ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_identity_falls_back_to_first_account() {
        let unknown = Address::new([0x99; 20]);
        let f = flow(
            StubLedger::with_contract(),
            vec![complaint("c1")],
            SyncConfig {
                auto_deploy: false,
                wallet: Some(unknown),
            },
        );
        f.orchestrator.submit_pending().await.unwrap();
        let (_, _, submitter) = f.ledger.submissions()[0];
        assert_eq!(submitter, Address::new([0x0a; 20]));
    }

    #[tokio::test]
    async fn test_configured_identity_matches_case_insensitively() {
        let wallet: Address = "0x0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B0B".parse().unwrap();
        let f = flow(
            StubLedger::with_contract(),
            vec![complaint("c1")],
            SyncConfig {
                auto_deploy: false,
                wallet: Some(wallet),
            },
        );
        let report = f.orchestrator.submit_pending().await.unwrap();
        assert_eq!(report.signer, Some(Address::new([0x0b; 20])));
    }

    #[tokio::test]
    async fn test_no_accounts_is_fatal() {
        let ledger = StubLedger::with_contract();
        ledger.set_accounts(Vec::new());
        let f = flow(ledger, vec![complaint("c1")], SyncConfig::default());
        assert_eq!(
            f.orchestrator.run_pass().await.unwrap_err(),
            SyncError::NoSigningIdentity
        );
    }

    // =============================================================================
    // VERIFICATION FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_absent_fingerprint_is_failed_then_resubmitted() {
        let c1 = complaint("c1");
        let fp = fingerprint(&c1).unwrap();
        let f = default_flow(vec![c1]);
        f.orchestrator.submit_pending().await.unwrap();

        f.ledger.report_absent(fp);
        let verification = f.orchestrator.verify_confirmed().await.unwrap();
        assert_eq!(verification.summary().verification_failed, 1);

        let record = f.store.find_pending_or_failed("c1").await.unwrap().unwrap();
        assert_eq!(record.status, RecordStatus::Failed);
        assert!(record.error_message.is_some());

        f.ledger.clear_absent();
        let next = f.orchestrator.run_pass().await.unwrap();
        assert_eq!(next.submissions[0].kind, OutcomeKind::Success);
        assert_eq!(next.summary().verified, 1);
        assert_eq!(f.ledger.submissions().len(), 2);
    }

    #[tokio::test]
    async fn test_query_error_is_not_a_failure() {
        let f = default_flow(vec![complaint("c1")]);
        f.orchestrator.submit_pending().await.unwrap();

        f.ledger.set_query_errors(true);
        let verification = f.orchestrator.verify_confirmed().await.unwrap();
        assert_eq!(verification.summary().verification_error, 1);
        assert_eq!(verification.summary().verification_failed, 0);

        let record = f.store.find_confirmed("c1").await.unwrap().unwrap();
        assert!(record.error_message.is_none());
    }

    // =============================================================================
    // END TO END
    // =============================================================================

    #[tokio::test]
    async fn test_reference_complaint_end_to_end() {
        let f = default_flow(vec![reference_complaint()]);

        let report = f.orchestrator.run_pass().await.unwrap();
        let submission = &report.submissions[0];
        assert_eq!(submission.kind, OutcomeKind::Success);
        assert_eq!(
            submission.fingerprint.map(|fp| fp.to_hex()).as_deref(),
            Some(REFERENCE_FINGERPRINT)
        );
        assert_eq!(
            submission.transaction_hash.as_ref().map(|tx| tx.as_str()),
            Some("0xT1")
        );
        assert_eq!(report.verifications[0].kind, OutcomeKind::Verified);

        let record = f.store.find_confirmed("abc123").await.unwrap().unwrap();
        assert_eq!(record.fingerprint.to_hex(), REFERENCE_FINGERPRINT);
        assert_eq!(record.contract_address, STUB_CONTRACT);
        assert_eq!(
            record.transaction_hash.as_ref().map(|tx| tx.as_str()),
            Some("0xT1")
        );
        assert_eq!(record.complaint_data, reference_complaint());
    }

    #[tokio::test]
    async fn test_empty_backlog_is_not_an_error() {
        let f = default_flow(Vec::new());
        let report = f.orchestrator.run_pass().await.unwrap();
        assert!(report.submissions.is_empty());
        assert!(report.verifications.is_empty());
        assert_eq!(report.contract, Some(STUB_CONTRACT));
    }
}
