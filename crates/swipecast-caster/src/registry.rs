use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use swipecast_protocol::event::{CastAttempt, CastAttemptStatus};
use swipecast_protocol::ids::{CastAttemptId, ItemId, SessionGeneration};
use tokio::sync::RwLock;

/// Tracks every commit attempt by id. Attempts are independent of the queue
/// and of each other; the registry only records their status transitions.
#[derive(Default)]
pub struct CastAttemptRegistry {
    next_attempt_id: AtomicU64,
    attempts: RwLock<HashMap<CastAttemptId, CastAttempt>>,
}

impl CastAttemptRegistry {
    pub async fn begin(&self, item_id: ItemId, generation: SessionGeneration) -> CastAttempt {
        let attempt = CastAttempt {
            attempt_id: self.next_attempt_id(),
            item_id,
            generation,
            status: CastAttemptStatus::Pending,
        };
        let mut attempts = self.attempts.write().await;
        attempts.insert(attempt.attempt_id, attempt.clone());
        attempt
    }

    /// Records the terminal status for an attempt. Returns `None` for an
    /// unknown attempt, and leaves an already-resolved attempt untouched so
    /// a late duplicate resolution cannot overwrite the first one.
    pub async fn resolve(
        &self,
        attempt_id: CastAttemptId,
        status: CastAttemptStatus,
    ) -> Option<CastAttempt> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts.get_mut(&attempt_id)?;
        if !attempt.status.is_resolved() {
            attempt.status = status;
        }
        Some(attempt.clone())
    }

    pub async fn snapshot(&self, attempt_id: CastAttemptId) -> Option<CastAttempt> {
        let attempts = self.attempts.read().await;
        attempts.get(&attempt_id).cloned()
    }

    /// Removes resolved attempts from superseded generations, returning
    /// their ids so per-attempt event channels can be torn down. Pending
    /// stale attempts stay until their pipeline resolves.
    pub async fn prune_stale(&self, live_generation: SessionGeneration) -> Vec<CastAttemptId> {
        let mut attempts = self.attempts.write().await;
        let stale: Vec<CastAttemptId> = attempts
            .values()
            .filter(|attempt| {
                attempt.generation != live_generation && attempt.status.is_resolved()
            })
            .map(|attempt| attempt.attempt_id)
            .collect();
        for attempt_id in &stale {
            attempts.remove(attempt_id);
        }
        stale
    }

    pub async fn pending_count(&self) -> usize {
        let attempts = self.attempts.read().await;
        attempts
            .values()
            .filter(|attempt| !attempt.status.is_resolved())
            .count()
    }

    fn next_attempt_id(&self) -> CastAttemptId {
        let mut current = self.next_attempt_id.load(Ordering::Relaxed);
        loop {
            let next = current.checked_add(1).expect("cast attempt id exhausted");
            match self.next_attempt_id.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}
