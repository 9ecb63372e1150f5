//! Domain layer for the Sync Orchestrator.

pub mod config;
pub mod errors;
pub mod outcome;

pub use config::SyncConfig;
pub use errors::{SourceError, SyncError};
pub use outcome::{ComplaintOutcome, OutcomeKind, SyncReport, SyncSummary};
