//! # Orchestrator Configuration

use shared_types::Address;

/// Sync Orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Deploy a contract when none is active instead of failing.
    pub auto_deploy: bool,
    /// Preferred signing identity. Used only if the runtime has it unlocked.
    pub wallet: Option<Address>,
}
