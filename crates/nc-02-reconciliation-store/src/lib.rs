//! # NC-02 Reconciliation Store
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Tracks, per complaint, whether its fingerprint reached the ledger, and
//! keeps the registry of deployed fingerprint-registry contracts.
//!
//! ## Lifecycle
//!
//! ```text
//!   SubmissionResumed
//!     ┌──┐   SubmissionConfirmed
//!     ▼  │
//!   pending ─────────────────────▶ confirmed
//!     │  ▲                             │
//!     │  │ RetryRequested              │ VerificationFailed
//!     ▼  │                             ▼
//!   failed ◀───────────────────────────┘
//!          SubmissionFailed (from pending)
//! ```
//!
//! Records are never deleted.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Only table transitions are applied | `domain/lifecycle.rs` - `transition()` |
//! | INVARIANT-2 | At most one record per complaint | adapters - `complaint_index` check in `create` |
//! | INVARIANT-3 | At most one confirmed record per complaint | adapters - `mark_confirmed` |
//! | INVARIANT-4 | Every write is atomic | `InMemoryStore` single lock, `RocksDbStore` single `WriteBatch` |
//! | INVARIANT-5 | Contract addresses are unique | adapters - `ContractRegistry::record` |
//!
//! ## Module Structure
//!
//! ```text
//! nc-02-reconciliation-store/
//! ├── domain/     # ReconciliationRecord, RecordStatus, transition(), StoreError
//! ├── ports/      # ReconciliationStore, ContractRegistry
//! └── adapters/   # InMemoryStore, RocksDbStore
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use domain::{
    transition, NewRecord, ReconciliationRecord, RecordEvent, RecordStatus, SortOrder, StoreError,
    TransitionRejected,
};
pub use ports::{ContractRegistry, ReconciliationStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
