//! # Contract Bookkeeping
//!
//! Registry changes that need neither the ledger runtime nor the compiled
//! artifact. The orchestrator delegates here; the operator CLI calls these
//! directly.

use crate::domain::SyncError;
use nc_02_reconciliation_store::ContractRegistry;
use shared_types::{Address, ContractHandle, TxHash};
use tracing::{info, instrument};

/// Marker stored as the deployer of hand-registered contracts.
pub const MANUAL_DEPLOYER: &str = "manual-entry";

/// Registers a contract deployed outside this tool as the active one.
///
/// Without a transaction reference the handle carries the
/// [`TxHash::MANUAL`] marker. Every previously active handle is deactivated.
///
/// ## Errors
///
/// - `ContractAlreadyRecorded`: the address is already in the registry
#[instrument(skip(registry, tx, deployer), fields(contract = %address))]
pub async fn record_contract<G: ContractRegistry>(
    registry: &G,
    deployer: Option<Address>,
    tx: Option<TxHash>,
    address: Address,
) -> Result<ContractHandle, SyncError> {
    let deployed_by = deployer.map_or_else(|| MANUAL_DEPLOYER.to_string(), |d| d.to_hex());
    let handle = ContractHandle::new_active(
        address,
        deployed_by,
        tx.unwrap_or_else(|| TxHash::new(TxHash::MANUAL)),
    );
    registry.record(handle.clone()).await?;
    info!("contract recorded");
    Ok(handle)
}

/// Makes a recorded contract the active one and deactivates every other.
///
/// ## Errors
///
/// - `UnknownContract`: the address is not in the registry
#[instrument(skip(registry), fields(contract = %address))]
pub async fn activate_contract<G: ContractRegistry>(
    registry: &G,
    address: Address,
) -> Result<ContractHandle, SyncError> {
    registry.set_active(address, true).await?;
    let handle = registry
        .latest_active()
        .await?
        .filter(|h| h.address == address)
        .ok_or(SyncError::UnknownContract(address))?;
    info!("contract activated");
    Ok(handle)
}
