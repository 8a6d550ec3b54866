use serde::{Deserialize, Serialize};

use crate::ids::{CastAttemptId, ItemId, SessionGeneration};

/// Opaque handle returned by a successful mint submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastReceipt {
    pub transaction_hash: String,
    pub coin_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastAttemptStatus {
    Pending,
    Success(CastReceipt),
    Error(String),
}

impl CastAttemptStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Snapshot of one attempt as tracked by the caster registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAttempt {
    pub attempt_id: CastAttemptId,
    pub item_id: ItemId,
    pub generation: SessionGeneration,
    pub status: CastAttemptStatus,
}

/// Status transition published on the eventbus when an attempt starts or
/// resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastStatusEvent {
    pub attempt_id: CastAttemptId,
    pub item_id: ItemId,
    pub generation: SessionGeneration,
    pub status: CastAttemptStatus,
}
