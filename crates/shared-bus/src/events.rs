//! # Ledger Events
//!
//! Defines all event types that flow through the shared bus. Each carries
//! the operation name, the item/batch ids touched, the acting principal,
//! the resulting stage and the document uri when one was attached.

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, ItemId, Operation, Principal, Role, Stage, Timestamp};

/// All events that can be published to the event bus.
///
/// One event is produced per successful mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SubsidyEvent {
    // =========================================================================
    // ROLE REGISTRY
    // =========================================================================
    /// A principal was added to a role.
    RoleGranted {
        /// Role granted.
        role: Role,
        /// New member.
        principal: Principal,
        /// Administrator that granted it.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// A principal left a role (revoked or renounced).
    RoleRevoked {
        /// `RevokeRole` or `RenounceRole`.
        operation: Operation,
        /// Role removed.
        role: Role,
        /// Former member.
        principal: Principal,
        /// Principal that performed the removal.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    // =========================================================================
    // ITEM LEDGER
    // =========================================================================
    /// A new item was registered at `Created`.
    ItemCreated {
        /// Allocated id.
        item_id: ItemId,
        /// Principal entitled to claim.
        beneficiary: Principal,
        /// Processor that created it.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// An item moved one stage forward with evidence attached.
    ItemAdvanced {
        /// `ProcessItem`, `TransportItem` or `DistributeItem`.
        operation: Operation,
        /// Item moved.
        item_id: ItemId,
        /// Role holder that moved it.
        actor: Principal,
        /// New stage.
        stage: Stage,
        /// Evidence attached with the transition.
        document_uri: String,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// An item reached `Claimed`.
    SubsidyClaimed {
        /// `ClaimSubsidy` or `VerifyIndividualClaim`.
        operation: Operation,
        /// Item claimed.
        item_id: ItemId,
        /// Batch the item belongs to, if any.
        batch_id: Option<BatchId>,
        /// Beneficiary of the item.
        beneficiary: Principal,
        /// Principal that performed the claim (beneficiary or relay).
        actor: Principal,
        /// Optional claim evidence.
        document_uri: Option<String>,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// Supplementary evidence attached without a stage change.
    DocumentAttached {
        /// Item the document belongs to.
        item_id: ItemId,
        /// Stage the evidence relates to.
        stage_tag: Stage,
        /// Document uri.
        uri: String,
        /// Principal that attached it.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// Free-form custodial note appended to an item's audit log.
    ActionLogged {
        /// Item the note belongs to.
        item_id: ItemId,
        /// Note text.
        action: String,
        /// Principal that logged it.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    // =========================================================================
    // BATCH LEDGER
    // =========================================================================
    /// A batch was formed; every member cascaded to `Processed`.
    BatchCreated {
        /// Allocated batch id.
        batch_id: BatchId,
        /// Members, in request order.
        item_ids: Vec<ItemId>,
        /// Free-text note.
        note: String,
        /// Processor that created it.
        actor: Principal,
        /// Commit time.
        timestamp: Timestamp,
    },

    /// A batch moved one stage forward; every member followed.
    BatchAdvanced {
        /// `TransportBatch` or `DistributeBatch`.
        operation: Operation,
        /// Batch moved.
        batch_id: BatchId,
        /// Members moved with it.
        item_ids: Vec<ItemId>,
        /// Role holder that moved it.
        actor: Principal,
        /// New stage.
        stage: Stage,
        /// Evidence attached with the transition.
        document_uri: String,
        /// Commit time.
        timestamp: Timestamp,
    },
}

impl SubsidyEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => EventTopic::Roles,
            Self::ItemCreated { .. } | Self::ItemAdvanced { .. } => EventTopic::Items,
            Self::SubsidyClaimed { .. } => EventTopic::Claims,
            Self::DocumentAttached { .. } | Self::ActionLogged { .. } => EventTopic::Audit,
            Self::BatchCreated { .. } | Self::BatchAdvanced { .. } => EventTopic::Batches,
        }
    }

    /// Name of the operation that produced this event.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::RoleGranted { .. } => Operation::GrantRole,
            Self::RoleRevoked { operation, .. }
            | Self::ItemAdvanced { operation, .. }
            | Self::SubsidyClaimed { operation, .. }
            | Self::BatchAdvanced { operation, .. } => *operation,
            Self::ItemCreated { .. } => Operation::CreateItem,
            Self::DocumentAttached { .. } => Operation::AddDocument,
            Self::ActionLogged { .. } => Operation::LogAction,
            Self::BatchCreated { .. } => Operation::CreateBatch,
        }
    }

    /// The principal that performed the operation.
    #[must_use]
    pub fn actor(&self) -> Principal {
        match self {
            Self::RoleGranted { actor, .. }
            | Self::RoleRevoked { actor, .. }
            | Self::ItemCreated { actor, .. }
            | Self::ItemAdvanced { actor, .. }
            | Self::SubsidyClaimed { actor, .. }
            | Self::DocumentAttached { actor, .. }
            | Self::ActionLogged { actor, .. }
            | Self::BatchCreated { actor, .. }
            | Self::BatchAdvanced { actor, .. } => *actor,
        }
    }

    /// Commit time of the operation.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::RoleGranted { timestamp, .. }
            | Self::RoleRevoked { timestamp, .. }
            | Self::ItemCreated { timestamp, .. }
            | Self::ItemAdvanced { timestamp, .. }
            | Self::SubsidyClaimed { timestamp, .. }
            | Self::DocumentAttached { timestamp, .. }
            | Self::ActionLogged { timestamp, .. }
            | Self::BatchCreated { timestamp, .. }
            | Self::BatchAdvanced { timestamp, .. } => *timestamp,
        }
    }

    /// Items whose state or evidence changed.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        match self {
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => Vec::new(),
            Self::ItemCreated { item_id, .. }
            | Self::ItemAdvanced { item_id, .. }
            | Self::SubsidyClaimed { item_id, .. }
            | Self::DocumentAttached { item_id, .. }
            | Self::ActionLogged { item_id, .. } => vec![*item_id],
            Self::BatchCreated { item_ids, .. } | Self::BatchAdvanced { item_ids, .. } => {
                item_ids.clone()
            }
        }
    }

    /// Batch touched by the operation, if any.
    #[must_use]
    pub fn batch_id(&self) -> Option<BatchId> {
        match self {
            Self::BatchCreated { batch_id, .. } | Self::BatchAdvanced { batch_id, .. } => {
                Some(*batch_id)
            }
            Self::SubsidyClaimed { batch_id, .. } => *batch_id,
            _ => None,
        }
    }

    /// Stage reached by the operation, for stage-changing events.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ItemCreated { .. } => Some(Stage::Created),
            Self::ItemAdvanced { stage, .. } | Self::BatchAdvanced { stage, .. } => Some(*stage),
            Self::SubsidyClaimed { .. } => Some(Stage::Claimed),
            Self::BatchCreated { .. } => Some(Stage::Processed),
            _ => None,
        }
    }

    /// The stage the goods are handed over to next.
    ///
    /// Handoff tooling uses this to prepare the next custodian's ticket;
    /// `None` once the lifecycle is complete or for non-transition events.
    #[must_use]
    pub fn next_stage(&self) -> Option<Stage> {
        self.stage().and_then(|stage| stage.next())
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Role grants and revocations.
    Roles,
    /// Item creation and item-level transitions.
    Items,
    /// Batch creation and cascades.
    Batches,
    /// Claims (direct and batch disaggregation).
    Claims,
    /// Supplementary documents and custodial notes.
    Audit,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Items to follow. Empty means all items.
    pub item_ids: Vec<ItemId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            item_ids: Vec::new(),
        }
    }

    /// Create a filter following specific items (including batch cascades
    /// that touch them).
    #[must_use]
    pub fn for_items(item_ids: Vec<ItemId>) -> Self {
        Self {
            topics: Vec::new(),
            item_ids,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SubsidyEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let item_match = self.item_ids.is_empty()
            || event
                .item_ids()
                .iter()
                .any(|item_id| self.item_ids.contains(item_id));

        topic_match && item_match
    }
}
