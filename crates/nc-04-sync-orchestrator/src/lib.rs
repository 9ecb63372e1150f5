//! # Sync Orchestrator Subsystem
//!
//! Reconciles the complaint backlog with the fingerprint ledger. A pass
//! fingerprints every complaint without a confirmed record, anchors it on
//! the active contract, and then re-checks every confirmed record.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐     ┌────────────────┐
//! │ ComplaintSource  │────►│   SyncOrchestrator   │────►│   LedgerApi    │
//! │ (file/http/mem)  │     │  submit  │  verify   │     │    (nc-03)     │
//! └──────────────────┘     └──────────┬───────────┘     └────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌──────────────────────┐
//!                          │ ReconciliationStore  │
//!                          │ + ContractRegistry   │
//!                          │       (nc-02)        │
//!                          └──────────────────────┘
//! ```
//!
//! ## Failure Model
//!
//! | Condition | Effect |
//! |-----------|--------|
//! | No active contract, auto-deploy off | Pass aborts (`NoActiveContract`) |
//! | No unlocked accounts | Pass aborts (`NoSigningIdentity`) |
//! | Zero balance | Pass aborts before any submission |
//! | Backlog unreadable | Pass aborts (`ComplaintSource`) |
//! | Store unreachable or corrupted | Pass aborts (`PersistenceUnavailable`) |
//! | Store refuses a lifecycle change | Pass aborts (`RecordConflict`) |
//! | Malformed complaint | `failed` outcome, no record |
//! | Submission error | Record `failed`, pass continues |
//! | Fingerprint missing on ledger | Record `failed`, `verification-failed` |
//! | Verification query error | Record untouched, `verification-error` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod contracts;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{HttpComplaintSource, HttpSourceConfig, InMemorySource, JsonFileSource};
pub use domain::{
    ComplaintOutcome, OutcomeKind, SourceError, SyncConfig, SyncError, SyncReport, SyncSummary,
};
pub use ports::ComplaintSource;
pub use contracts::{activate_contract, record_contract, MANUAL_DEPLOYER};
pub use service::{SyncOrchestrator, NOT_ON_LEDGER};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
