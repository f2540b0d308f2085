//! # Domain Entities
//!
//! The item record tracked through the lifecycle.

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, ItemId, Principal, Stage, Timestamp};

/// A unit of subsidy goods.
///
/// `id` and `beneficiary` never change after creation; `stage` only moves
/// forward one step at a time and `claimed` flips once, together with the
/// final step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Sequential id, starting at 1.
    pub id: ItemId,
    /// Principal entitled to claim.
    pub beneficiary: Principal,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// Whether the subsidy has been claimed.
    pub claimed: bool,
    /// Batch that moves this item, once assigned.
    pub batch_id: Option<BatchId>,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Item {
    /// A freshly registered item.
    #[must_use]
    pub fn new(id: ItemId, beneficiary: Principal, created_at: Timestamp) -> Self {
        Self {
            id,
            beneficiary,
            stage: Stage::Created,
            claimed: false,
            batch_id: None,
            created_at,
        }
    }

    /// Whether a batch owns this item's intermediate transitions.
    #[must_use]
    pub fn is_batch_managed(&self) -> bool {
        self.batch_id.is_some()
    }

    /// Whether the item can be claimed right now.
    #[must_use]
    pub fn is_claimable(&self) -> bool {
        !self.claimed && self.stage == Stage::Distributed
    }
}
