//! The attempt ledger facade.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use reelgen_models::RegenerationAttempt;

use crate::error::LedgerResult;
use crate::store::AttemptStore;

/// Append-only per-scene history of regeneration attempts.
///
/// The ledger never deduplicates or renumbers: `attempt_number` is assigned
/// by the caller at decision time, which is only correct under a
/// single-writer-per-scene discipline (at most one in-flight regeneration
/// per scene).
#[derive(Clone)]
pub struct AttemptLedger {
    store: Arc<dyn AttemptStore>,
}

impl AttemptLedger {
    /// Create a ledger over the given store.
    pub fn new(store: Arc<dyn AttemptStore>) -> Self {
        Self { store }
    }

    /// Append an attempt record.
    pub async fn record_attempt(&self, record: &RegenerationAttempt) -> LedgerResult<()> {
        self.store.insert(record).await?;
        counter!("reelgen_attempts_recorded_total").increment(1);
        info!(
            scene_id = %record.scene_id,
            project_id = %record.project_id,
            attempt = record.attempt_number,
            provider = %record.provider,
            result = record.result.as_str(),
            "Recorded regeneration attempt"
        );
        Ok(())
    }

    /// Fetch up to `limit` attempts for a scene, most recent first.
    pub async fn get_attempts(
        &self,
        scene_id: &str,
        limit: usize,
    ) -> LedgerResult<Vec<RegenerationAttempt>> {
        self.store.query(scene_id, limit).await
    }

    /// Erase a scene's history. Admin reset only; the automatic
    /// regeneration loop never calls this.
    pub async fn clear_history(&self, scene_id: &str) -> LedgerResult<()> {
        self.store.delete(scene_id).await?;
        counter!("reelgen_histories_cleared_total").increment(1);
        warn!(scene_id = %scene_id, "Cleared scene attempt history");
        Ok(())
    }
}
