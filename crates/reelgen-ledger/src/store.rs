//! Attempt storage backends.
//!
//! The persistence layer behind the ledger is a collaborator: production
//! deployments implement `AttemptStore` over their database, while tests
//! and single-process deployments use `MemoryAttemptStore`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use reelgen_models::RegenerationAttempt;

use crate::error::LedgerResult;

/// Storage contract for attempt records.
///
/// Implementations must return records from `query` ordered most-recent
/// first and must never exceed the requested limit.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Append an attempt record. Records are never updated in place.
    async fn insert(&self, record: &RegenerationAttempt) -> LedgerResult<()>;

    /// Fetch up to `limit` records for a scene, most recent first.
    async fn query(&self, scene_id: &str, limit: usize) -> LedgerResult<Vec<RegenerationAttempt>>;

    /// Delete all records for a scene.
    async fn delete(&self, scene_id: &str) -> LedgerResult<()>;
}

/// In-memory attempt store backed by an async `RwLock`.
#[derive(Default)]
pub struct MemoryAttemptStore {
    records: Arc<RwLock<HashMap<String, Vec<RegenerationAttempt>>>>,
}

impl MemoryAttemptStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn insert(&self, record: &RegenerationAttempt) -> LedgerResult<()> {
        let mut records = self.records.write().await;
        records
            .entry(record.scene_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn query(&self, scene_id: &str, limit: usize) -> LedgerResult<Vec<RegenerationAttempt>> {
        let records = self.records.read().await;
        let mut attempts = records.get(scene_id).cloned().unwrap_or_default();
        // Descending by timestamp, attempt number as tie-break for
        // same-millisecond inserts.
        attempts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.attempt_number.cmp(&a.attempt_number))
        });
        attempts.truncate(limit);
        Ok(attempts)
    }

    async fn delete(&self, scene_id: &str) -> LedgerResult<()> {
        let mut records = self.records.write().await;
        records.remove(scene_id);
        Ok(())
    }
}
