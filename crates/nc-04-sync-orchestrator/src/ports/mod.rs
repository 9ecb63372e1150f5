//! # Ports
//!
//! The orchestrator drives the store and ledger ports of the other
//! subsystems. Its only own port is the complaint backlog.

use crate::domain::SourceError;
use async_trait::async_trait;
use shared_types::ComplaintRecord;

/// Source of the complaint backlog.
#[async_trait]
pub trait ComplaintSource: Send + Sync {
    /// Lists complaints in processing order.
    async fn list_complaints(&self) -> Result<Vec<ComplaintRecord>, SourceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
