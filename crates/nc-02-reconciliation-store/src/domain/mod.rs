//! # Domain Layer
//!
//! Reconciliation records and their lifecycle. No I/O.

pub mod entities;
pub mod errors;
pub mod lifecycle;

pub use entities::{NewRecord, ReconciliationRecord, SortOrder};
pub use errors::StoreError;
pub use lifecycle::{transition, RecordEvent, RecordStatus, TransitionRejected};
