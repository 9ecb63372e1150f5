//! Command-line arguments.
//!
//! Every setting can come from the environment; flags win.

use clap::Parser;
use nc_02_reconciliation_store::RocksDbConfig;
use nc_03_ledger_client::{LedgerConfig, RpcConfig};
use nc_04_sync_orchestrator::{HttpSourceConfig, SyncConfig};
use shared_types::{Address, TxHash};
use std::path::PathBuf;
use std::time::Duration;

/// NyayaCop ledger sync admin
#[derive(Parser, Debug)]
#[command(name = "nc-admin", version)]
#[command(about = "Anchor complaint fingerprints on the ledger and reconcile them")]
pub struct Cli {
    /// Ledger runtime JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:7545")]
    pub rpc_url: String,

    /// Reconciliation store directory
    #[arg(long, env = "STORE_PATH", default_value = "./data/ledger-sync")]
    pub store_path: PathBuf,

    /// Preferred signing wallet
    #[arg(long, env = "WALLET_ADDRESS")]
    pub wallet: Option<Address>,

    /// Compiled contract artifact
    #[arg(
        long,
        env = "CONTRACT_ARTIFACT",
        default_value = "build/contracts/MongoDataStorage.json"
    )]
    pub artifact: PathBuf,

    /// Complaint export file, or http(s):// base of the complaint API
    #[arg(long, env = "COMPLAINTS_SOURCE", default_value = "./data/complaints.json")]
    pub complaints: String,

    /// Bearer token for the complaint API
    #[arg(long, env = "COMPLAINTS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Upper bound on each ledger operation, in seconds
    #[arg(long, env = "LEDGER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Deploy a new contract and make it active
    #[arg(long, group = "action")]
    pub deploy: bool,

    /// Verify every confirmed record against the ledger
    #[arg(long, group = "action")]
    pub verify: bool,

    /// Register an externally deployed contract
    #[arg(long, num_args = 2, value_names = ["TX", "ADDR"], group = "action")]
    pub record_contract: Option<Vec<String>>,

    /// Make a recorded contract the active one
    #[arg(long, value_name = "ADDR", group = "action")]
    pub activate_contract: Option<Address>,

    /// List confirmed records, newest first
    #[arg(long, group = "action")]
    pub list: bool,

    /// With --list, include pending and failed records
    #[arg(long, requires = "list")]
    pub all: bool,

    /// Show one complaint's record, on-chain check and transaction
    #[arg(long, value_name = "ID", group = "action")]
    pub complaint: Option<String>,

    /// Show recorded contracts and recent on-chain hashes
    #[arg(long, group = "action")]
    pub contracts: bool,

    /// During a sync pass, deploy when no contract is active
    #[arg(long)]
    pub auto_deploy: bool,
}

/// What to do, derived from the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Full sync pass.
    Sync,
    /// Deploy a contract.
    Deploy,
    /// Verification pass.
    Verify,
    /// Register an existing contract.
    RecordContract {
        /// Deployment transaction.
        tx: TxHash,
        /// Contract address.
        address: Address,
    },
    /// Switch the active contract.
    ActivateContract(Address),
    /// List records.
    List {
        /// Include every status.
        all: bool,
    },
    /// Complaint detail.
    Complaint(String),
    /// Contract overview.
    Contracts,
}

/// Where the backlog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacklogLocation {
    /// JSON export on disk.
    File(PathBuf),
    /// Complaint API base URL.
    Api(String),
}

impl Cli {
    /// Selected action.
    pub fn action(&self) -> anyhow::Result<Action> {
        if self.deploy {
            return Ok(Action::Deploy);
        }
        if self.verify {
            return Ok(Action::Verify);
        }
        if let Some(values) = &self.record_contract {
            let [tx, address] = values.as_slice() else {
                anyhow::bail!("--record-contract takes a transaction hash and an address");
            };
            return Ok(Action::RecordContract {
                tx: TxHash::new(tx.as_str()),
                address: address.parse()?,
            });
        }
        if let Some(address) = self.activate_contract {
            return Ok(Action::ActivateContract(address));
        }
        if self.list {
            return Ok(Action::List { all: self.all });
        }
        if let Some(id) = &self.complaint {
            return Ok(Action::Complaint(id.clone()));
        }
        if self.contracts {
            return Ok(Action::Contracts);
        }
        Ok(Action::Sync)
    }

    /// Backlog location.
    pub fn backlog(&self) -> BacklogLocation {
        let source = self.complaints.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            BacklogLocation::Api(source.to_string())
        } else {
            BacklogLocation::File(PathBuf::from(source))
        }
    }

    /// Orchestrator settings.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            auto_deploy: self.auto_deploy,
            wallet: self.wallet,
        }
    }

    /// Ledger service settings.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..LedgerConfig::default()
        }
    }

    /// JSON-RPC transport settings.
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            ..RpcConfig::default()
        }
    }

    /// Store settings.
    pub fn store_config(&self) -> RocksDbConfig {
        RocksDbConfig::at(&self.store_path)
    }

    /// Complaint API settings.
    pub fn http_source_config(&self, base_url: String) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url,
            token: self.api_token.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
