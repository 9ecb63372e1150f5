//! # NC-Admin
//!
//! Operator CLI for the ledger sync: runs passes, verifies confirmed
//! records, and manages contract handles.

pub mod cli;
pub mod commands;
pub mod render;
