//! # Test Fixtures
//!
//! `StubLedger` implements the ledger port directly with scripted answers,
//! so flows can be checked without a runtime or ABI encoding in the way.

use async_trait::async_trait;
use nc_03_ledger_client::{LedgerApi, LedgerError, TransactionDetails};
use parking_lot::Mutex;
use primitive_types::U256;
use shared_types::{Address, ComplaintRecord, ContractHandle, Fingerprint, TxHash};
use std::collections::HashSet;

/// Address the stub assigns to deployed contracts.
pub const STUB_CONTRACT: Address = Address([0xcc; 20]);

#[derive(Default)]
struct StubState {
    accounts: Vec<Address>,
    balance: U256,
    active: Option<ContractHandle>,
    stored: Vec<Fingerprint>,
    failing: HashSet<Fingerprint>,
    absent: HashSet<Fingerprint>,
    query_errors: bool,
    submissions: Vec<(Address, Fingerprint, Address)>,
    tx_counter: u64,
}

/// Scripted ledger.
pub struct StubLedger {
    state: Mutex<StubState>,
}

impl StubLedger {
    /// Two funded accounts and no contract.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                accounts: vec![Address::new([0x0a; 20]), Address::new([0x0b; 20])],
                balance: U256::exp10(18),
                ..StubState::default()
            }),
        }
    }

    /// Same, with an active contract already deployed.
    pub fn with_contract() -> Self {
        let stub = Self::new();
        stub.state.lock().active = Some(ContractHandle::new_active(
            STUB_CONTRACT,
            "0xdeployer",
            TxHash::new("0xD0"),
        ));
        stub
    }

    /// Sets the balance of every account.
    pub fn set_balance(&self, balance: U256) {
        self.state.lock().balance = balance;
    }

    /// Replaces the unlocked accounts.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Submissions of `fp` fail until cleared.
    pub fn fail_submission(&self, fp: Fingerprint) {
        self.state.lock().failing.insert(fp);
    }

    /// Clears scripted submission failures.
    pub fn heal(&self) {
        self.state.lock().failing.clear();
    }

    /// Verification of `fp` reports false until cleared.
    pub fn report_absent(&self, fp: Fingerprint) {
        self.state.lock().absent.insert(fp);
    }

    /// Clears scripted absences.
    pub fn clear_absent(&self) {
        self.state.lock().absent.clear();
    }

    /// Makes verification queries fail.
    pub fn set_query_errors(&self, failing: bool) {
        self.state.lock().query_errors = failing;
    }

    /// Every `submit_fingerprint` call, successful or not.
    pub fn submissions(&self) -> Vec<(Address, Fingerprint, Address)> {
        self.state.lock().submissions.clone()
    }

    /// Fingerprints accepted so far.
    pub fn stored(&self) -> Vec<Fingerprint> {
        self.state.lock().stored.clone()
    }
}

impl Default for StubLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerApi for StubLedger {
    async fn resolve_active_contract(&self) -> Result<Option<ContractHandle>, LedgerError> {
        Ok(self.state.lock().active.clone())
    }

    async fn deploy_contract(&self, deployer: Address) -> Result<ContractHandle, LedgerError> {
        let mut state = self.state.lock();
        if state.balance.is_zero() {
            return Err(LedgerError::Deployment("insufficient funds".into()));
        }
        let handle = ContractHandle::new_active(STUB_CONTRACT, deployer.to_hex(), TxHash::new("0xD0"));
        state.active = Some(handle.clone());
        Ok(handle)
    }

    async fn submit_fingerprint(
        &self,
        contract: Address,
        fingerprint: Fingerprint,
        submitter: Address,
    ) -> Result<TxHash, LedgerError> {
        let mut state = self.state.lock();
        state.submissions.push((contract, fingerprint, submitter));
        if state.failing.contains(&fingerprint) {
            return Err(LedgerError::Submission("transaction reverted".into()));
        }
        state.stored.push(fingerprint);
        state.tx_counter += 1;
        Ok(TxHash::new(format!("0xT{}", state.tx_counter)))
    }

    async fn verify_fingerprint(
        &self,
        _contract: Address,
        fingerprint: Fingerprint,
    ) -> Result<bool, LedgerError> {
        let state = self.state.lock();
        if state.query_errors {
            return Err(LedgerError::Query("connection refused".into()));
        }
        Ok(state.stored.contains(&fingerprint) && !state.absent.contains(&fingerprint))
    }

    async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
        Ok(self.state.lock().accounts.clone())
    }

    async fn balance_of(&self, _identity: Address) -> Result<U256, LedgerError> {
        Ok(self.state.lock().balance)
    }

    async fn hash_count(&self, _contract: Address) -> Result<U256, LedgerError> {
        Ok(U256::from(self.state.lock().stored.len()))
    }

    async fn hash_at(&self, _contract: Address, index: U256) -> Result<String, LedgerError> {
        let state = self.state.lock();
        usize::try_from(index.low_u64())
            .ok()
            .and_then(|i| state.stored.get(i))
            .map(Fingerprint::to_hex)
            .ok_or_else(|| LedgerError::Query("index out of range".into()))
    }

    async fn transaction_details(
        &self,
        _tx: &TxHash,
    ) -> Result<Option<TransactionDetails>, LedgerError> {
        Ok(None)
    }
}

/// Complaint with the given id and a distinct text.
pub fn complaint(id: &str) -> ComplaintRecord {
    ComplaintRecord::new(id, format!("complaint narrative for {id}"))
}

/// The reference complaint used in end-to-end checks.
pub fn reference_complaint() -> ComplaintRecord {
    ComplaintRecord::new("abc123", "theft reported").with_legal_sections(["IPC 379"])
}

/// Fingerprint of [`reference_complaint`].
pub const REFERENCE_FINGERPRINT: &str =
    "0x078d144789013e4390967ec1f1319558b0d4c299d79cc820c5142cc192d66b60";
