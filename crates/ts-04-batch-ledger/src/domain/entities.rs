//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, ItemId, Principal, Stage, Timestamp};

/// Upper bound on the number of members in one batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// A fixed group of items moved together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Sequential id, starting at 1.
    pub id: BatchId,
    /// Members in request order. Never changes after creation.
    pub member_item_ids: Vec<ItemId>,
    /// Furthest stage reached collectively. Never `Claimed`.
    pub stage: Stage,
    /// Free text, e.g. the warehouse.
    pub note: String,
    /// Processor that created it.
    pub created_by: Principal,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Batch {
    /// Whether `item_id` belongs to this batch.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.member_item_ids.contains(&item_id)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.member_item_ids.len()
    }

    /// Always false for a committed batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.member_item_ids.is_empty()
    }
}
