//! Append-only per-scene regeneration attempt history.
//!
//! This crate provides:
//! - The `AttemptStore` collaborator trait (insert/query/delete)
//! - An in-memory store for tests and single-process deployments
//! - The `AttemptLedger` facade with tracing and metrics

pub mod error;
pub mod ledger;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use ledger::AttemptLedger;
pub use store::{AttemptStore, MemoryAttemptStore};
