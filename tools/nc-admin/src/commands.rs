//! Command execution.
//!
//! Each command returns the text to print so the binary stays a thin shell.

use crate::cli::{Action, BacklogLocation, Cli};
use crate::render;
use anyhow::Context;
use async_trait::async_trait;
use nc_02_reconciliation_store::{
    ContractRegistry, RecordStatus, ReconciliationStore, RocksDbStore, SortOrder,
};
use nc_03_ledger_client::{JsonRpcLedger, LedgerApi, LedgerService};
use nc_04_sync_orchestrator::{
    activate_contract, record_contract, ComplaintSource, HttpComplaintSource, HttpSourceConfig,
    JsonFileSource, SourceError, SyncError, SyncOrchestrator,
};
use shared_types::{ComplaintRecord, U256};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Ledger client over JSON-RPC with the RocksDB registry.
pub type Ledger = LedgerService<JsonRpcLedger, RocksDbStore>;

/// Orchestrator wired to production adapters.
pub type Orchestrator = SyncOrchestrator<RocksDbStore, Ledger, Backlog>;

/// Number of recent on-chain hashes shown by `--contracts`.
const RECENT_HASHES: u64 = 5;

enum BacklogTarget {
    File(PathBuf),
    Api(HttpSourceConfig),
}

enum BacklogSource {
    File(JsonFileSource),
    Api(HttpComplaintSource),
}

/// Backlog chosen at runtime. Nothing is built until the backlog is read,
/// so commands that never list complaints never touch the complaint API.
pub struct Backlog {
    target: BacklogTarget,
    source: OnceCell<BacklogSource>,
}

impl Backlog {
    /// Describes the source for `cli` without building it.
    pub fn from_cli(cli: &Cli) -> Self {
        let target = match cli.backlog() {
            BacklogLocation::File(path) => BacklogTarget::File(path),
            BacklogLocation::Api(base) => BacklogTarget::Api(cli.http_source_config(base)),
        };
        Self {
            target,
            source: OnceCell::new(),
        }
    }

    /// Whether the backlog has been built.
    pub fn is_built(&self) -> bool {
        self.source.initialized()
    }

    async fn source(&self) -> Result<&BacklogSource, SourceError> {
        self.source
            .get_or_try_init(|| async {
                Ok(match &self.target {
                    BacklogTarget::File(path) => {
                        BacklogSource::File(JsonFileSource::new(path.clone()))
                    }
                    BacklogTarget::Api(config) => {
                        BacklogSource::Api(HttpComplaintSource::new(config.clone())?)
                    }
                })
            })
            .await
    }
}

#[async_trait]
impl ComplaintSource for Backlog {
    async fn list_complaints(&self) -> Result<Vec<ComplaintRecord>, SourceError> {
        match self.source().await? {
            BacklogSource::File(source) => source.list_complaints().await,
            BacklogSource::Api(source) => source.list_complaints().await,
        }
    }

    fn describe(&self) -> String {
        match &self.target {
            BacklogTarget::File(path) => path.display().to_string(),
            BacklogTarget::Api(config) => config.base_url.clone(),
        }
    }
}

/// Runs the action selected by `cli` and returns its output.
pub async fn execute(cli: &Cli) -> anyhow::Result<String> {
    let action = cli.action()?;
    let store = Arc::new(
        RocksDbStore::open(cli.store_config())
            .with_context(|| format!("opening store at {}", cli.store_path.display()))?,
    );

    match action {
        Action::List { all } => list(store.as_ref(), all).await,
        Action::Complaint(id) => complaint(store.as_ref(), &ledger(cli, store.clone())?, &id).await,
        Action::Contracts => contracts(store.as_ref(), &ledger(cli, store.clone())?).await,
        Action::RecordContract { tx, address } => {
            let handle =
                record_contract(store.as_ref(), cli.wallet, Some(tx), address).await?;
            Ok(format!("Recorded contract {} as active", handle.address))
        }
        Action::ActivateContract(address) => {
            let handle = activate_contract(store.as_ref(), address).await?;
            Ok(format!(
                "Contract {} is now active (deployed {})",
                handle.address,
                render::timestamp(&handle.deployed_at)
            ))
        }
        Action::Sync => {
            let report = orchestrator(cli, store)?.run_pass().await?;
            Ok(render::sync_report(&report))
        }
        Action::Verify => {
            let report = orchestrator(cli, store)?.verify_confirmed().await?;
            let mut out = render::sync_report(&report);
            if report.summary().verification_failed > 0 {
                out.push_str(
                    "\n\nSome fingerprints are missing from the ledger. \
                     The complaint data may have been altered or the ledger was reset.",
                );
            }
            Ok(out)
        }
        Action::Deploy => {
            let handle = orchestrator(cli, store)?.deploy_contract().await?;
            Ok(format!(
                "Deployed contract {}\nTransaction {}\nDeployed by {}",
                handle.address, handle.transaction_hash, handle.deployed_by
            ))
        }
    }
}

fn ledger(cli: &Cli, store: Arc<RocksDbStore>) -> anyhow::Result<Ledger> {
    let rpc = JsonRpcLedger::new(cli.rpc_config()).context("building JSON-RPC client")?;
    let ledger = LedgerService::from_artifact_path(
        Arc::new(rpc),
        store,
        &cli.artifact,
        cli.ledger_config(),
    )
    .map_err(SyncError::from)?;
    info!(
        rpc = %cli.rpc_url,
        contract = ledger.artifact().name(),
        "ledger client ready"
    );
    Ok(ledger)
}

fn orchestrator(cli: &Cli, store: Arc<RocksDbStore>) -> anyhow::Result<Orchestrator> {
    let ledger = ledger(cli, store.clone())?;
    Ok(SyncOrchestrator::new(
        store,
        Arc::new(ledger),
        Arc::new(Backlog::from_cli(cli)),
        cli.sync_config(),
    ))
}

/// `--list`: confirmed records (or every record with `all`), newest first.
pub async fn list<S: ReconciliationStore>(store: &S, all: bool) -> anyhow::Result<String> {
    let mut records = store.list_all(SortOrder::Newest).await?;
    if !all {
        records.retain(|r| r.status == RecordStatus::Confirmed);
    }
    if records.is_empty() {
        return Ok("No records found.".to_string());
    }

    let mut out = format!("{} record(s)\n{}", records.len(), render::records(&records));
    let _ = write!(out, "\n\nDetails: nc-admin --complaint <ID>");
    Ok(out)
}

/// `--complaint`: the record, an on-chain check and the transaction.
pub async fn complaint<S, L>(store: &S, ledger: &L, complaint_id: &str) -> anyhow::Result<String>
where
    S: ReconciliationStore,
    L: LedgerApi,
{
    if let Some(record) = store.find_confirmed(complaint_id).await? {
        let on_chain = match ledger
            .verify_fingerprint(record.contract_address, record.fingerprint)
            .await
        {
            Ok(found) => Some(found),
            Err(e) => {
                warn!(complaint_id, error = %e, "on-chain check failed");
                None
            }
        };
        let mut out = render::record_detail(&record, on_chain);

        if let Some(tx) = &record.transaction_hash {
            match ledger.transaction_details(tx).await {
                Ok(Some(details)) => out.push_str(&render::transaction(&details)),
                Ok(None) => out.push_str("\nTransaction not found on the ledger.\n"),
                Err(e) => {
                    warn!(complaint_id, error = %e, "transaction lookup failed");
                    out.push_str("\nCould not retrieve transaction details.\n");
                }
            }
        }
        return Ok(out);
    }

    match store.find_pending_or_failed(complaint_id).await? {
        Some(record) => Ok(render::record_detail(&record, None)),
        None => Ok(format!("No record found for complaint {complaint_id}.")),
    }
}

/// `--contracts`: recorded handles, then hash statistics of the active one.
pub async fn contracts<G, L>(registry: &G, ledger: &L) -> anyhow::Result<String>
where
    G: ContractRegistry,
    L: LedgerApi,
{
    let handles = registry.list().await?;
    if handles.is_empty() {
        return Ok(
            "No contracts recorded. Use --deploy or --record-contract <TX> <ADDR>.".to_string(),
        );
    }

    let mut out = format!("Contracts\n{}", render::contracts(&handles));
    let Some(active) = registry.latest_active().await? else {
        out.push_str("\n\nNo active contract.");
        return Ok(out);
    };
    let _ = write!(out, "\n\nActive contract: {}", active.address);

    let count = match ledger.hash_count(active.address).await {
        Ok(count) => count,
        Err(e) => {
            let _ = write!(out, "\nCould not read contract data: {e}");
            return Ok(out);
        }
    };
    let _ = write!(out, "\nHashes stored: {count}");

    let shown = count.min(U256::from(RECENT_HASHES)).low_u64();
    if shown > 0 {
        out.push_str("\nMost recent:");
    }
    for offset in 1..=shown {
        let index = count - U256::from(offset);
        match ledger.hash_at(active.address, index).await {
            Ok(hash) => {
                let _ = write!(out, "\n  #{index}: {hash}");
            }
            Err(e) => {
                let _ = write!(out, "\n  #{index}: unavailable ({e})");
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_02_reconciliation_store::{InMemoryStore, NewRecord};
    use nc_03_ledger_client::{FingerprintEncoding, InMemoryLedger, LedgerConfig};
    use shared_types::{Address, Fingerprint, TxHash};
    use std::time::Duration;

    fn ledger_over(
        chain: Arc<InMemoryLedger>,
        store: Arc<InMemoryStore>,
    ) -> LedgerService<InMemoryLedger, InMemoryStore> {
        LedgerService::new(
            chain,
            store,
            InMemoryLedger::artifact(FingerprintEncoding::Bytes32),
            LedgerConfig {
                timeout: Duration::from_millis(500),
                receipt_poll_interval: Duration::from_millis(5),
                ..LedgerConfig::default()
            },
        )
    }

    async fn confirmed(store: &InMemoryStore, id: &str, contract: Address, fp: Fingerprint) {
        let record = store
            .create(NewRecord {
                complaint_id: id.into(),
                fingerprint: fp,
                ledger_address: contract,
                submitter: Address::new([1; 20]),
                complaint_data: ComplaintRecord::new(id, "text"),
            })
            .await
            .unwrap();
        store
            .mark_confirmed(record.id, TxHash::new("0x01"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = InMemoryStore::new();
        confirmed(&store, "c1", Address::new([9; 20]), Fingerprint::new([1; 32])).await;
        store
            .create(NewRecord {
                complaint_id: "c2".into(),
                fingerprint: Fingerprint::new([2; 32]),
                ledger_address: Address::new([9; 20]),
                submitter: Address::new([1; 20]),
                complaint_data: ComplaintRecord::new("c2", "text"),
            })
            .await
            .unwrap();

        let confirmed_only = list(&store, false).await.unwrap();
        assert!(confirmed_only.starts_with("1 record(s)"));
        assert!(!confirmed_only.contains("c2"));

        let everything = list(&store, true).await.unwrap();
        assert!(everything.starts_with("2 record(s)"));
    }

    #[tokio::test]
    async fn test_complaint_detail_checks_chain() {
        let chain = Arc::new(InMemoryLedger::new());
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(chain.clone(), store.clone());
        let signer = chain.account_list()[0];
        let contract = ledger.deploy_contract(signer).await.unwrap().address;
        let fp = Fingerprint::new([5; 32]);
        ledger.submit_fingerprint(contract, fp, signer).await.unwrap();
        confirmed(&store, "abc123", contract, fp).await;

        let out = complaint(store.as_ref(), &ledger, "abc123").await.unwrap();
        assert!(out.contains("Verified on chain: yes"));

        let missing = complaint(store.as_ref(), &ledger, "zzz").await.unwrap();
        assert!(missing.contains("No record found"));
    }

    #[tokio::test]
    async fn test_contracts_shows_recent_hashes() {
        let chain = Arc::new(InMemoryLedger::new());
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(chain.clone(), store.clone());
        let signer = chain.account_list()[0];
        let contract = ledger.deploy_contract(signer).await.unwrap().address;
        for i in 0..7u8 {
            ledger
                .submit_fingerprint(contract, Fingerprint::new([i; 32]), signer)
                .await
                .unwrap();
        }

        let out = contracts(store.as_ref(), &ledger).await.unwrap();
        assert!(out.contains("Hashes stored: 7"));
        assert!(out.contains("#6:"));
        assert!(out.contains("#2:"));
        assert!(!out.contains("#1:"));
    }

    fn cli_without_artifact(dir: &tempfile::TempDir, action: &[&str]) -> Cli {
        use clap::Parser;
        let store = dir.path().join("store");
        let artifact = dir.path().join("missing-artifact.json");
        let complaints = dir.path().join("missing-complaints.json");
        let mut args = vec![
            "nc-admin".to_string(),
            "--store-path".to_string(),
            store.display().to_string(),
            "--artifact".to_string(),
            artifact.display().to_string(),
            "--complaints".to_string(),
            complaints.display().to_string(),
        ];
        args.extend(action.iter().map(|a| a.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn test_contract_bookkeeping_needs_no_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let first = "0x1111111111111111111111111111111111111111";
        let second = "0x2222222222222222222222222222222222222222";

        for address in [first, second] {
            let out = execute(&cli_without_artifact(
                &dir,
                &["--record-contract", "0xabc", address],
            ))
            .await
            .unwrap();
            assert!(out.starts_with("Recorded contract"));
        }

        let out = execute(&cli_without_artifact(&dir, &["--activate-contract", first]))
            .await
            .unwrap();
        assert!(out.contains(first));

        let listed = execute(&cli_without_artifact(&dir, &["--list"])).await.unwrap();
        assert_eq!(listed, "No records found.");
    }

    #[tokio::test]
    async fn test_sync_still_requires_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = execute(&cli_without_artifact(&dir, &[])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ArtifactMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_backlog_is_built_on_first_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let backlog = Backlog::from_cli(&cli_without_artifact(&dir, &[]));
        assert!(!backlog.is_built());
        assert!(backlog.describe().ends_with("missing-complaints.json"));

        assert!(matches!(
            backlog.list_complaints().await,
            Err(SourceError::Io { .. })
        ));
        assert!(backlog.is_built());
    }

    #[tokio::test]
    async fn test_contracts_empty_registry() {
        let chain = Arc::new(InMemoryLedger::new());
        let store = Arc::new(InMemoryStore::new());
        let ledger = ledger_over(chain, store.clone());
        let out = contracts(store.as_ref(), &ledger).await.unwrap();
        assert!(out.starts_with("No contracts recorded"));
    }
}
