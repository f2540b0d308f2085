//! # Subsidy Service
//!
//! Async front of the ledger aggregate.
//!
//! ## Ordering
//!
//! Every mutation runs under one write guard which is held until the
//! resulting event has been published, so subscribers observe events in
//! commit order. Reads take the read guard and see the latest committed
//! state.
//!
//! ## Concurrency
//!
//! Competing mutations on the same item are resolved by lock order: the
//! first one commits, later ones observe the new stage and fail.

use crate::config::RuntimeConfig;
use crate::ledger::SubsidyLedger;
use crate::ports::TimeSource;
use serde::Serialize;
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, Subscription, SubsidyEvent};
use shared_types::{
    BatchId, ErrorKind, ItemId, LedgerError, Operation, Principal, Role, Stage, Timestamp,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, instrument, warn, Span};
use ts_02_evidence::{DocumentRecord, LogEntry};
use ts_03_item_ledger::Item;
use ts_04_batch_ledger::Batch;
use uuid::Uuid;

/// Service statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    /// Mutations that committed.
    pub operations_committed: u64,
    /// Mutations that failed a precondition.
    pub operations_rejected: u64,
    /// Rejections caused by a missing role or identity.
    pub unauthorized_attempts: u64,
    /// Events handed to the bus.
    pub events_published: u64,
}

/// The subsidy ledger service.
///
/// Cheap to clone; clones share the ledger, the bus and the statistics.
#[derive(Clone)]
pub struct SubsidyService {
    ledger: Arc<RwLock<SubsidyLedger>>,
    bus: Arc<InMemoryEventBus>,
    clock: Arc<dyn TimeSource>,
    stats: Arc<RwLock<ServiceStats>>,
}

impl SubsidyService {
    /// Wrap an existing ledger.
    pub fn new(
        ledger: SubsidyLedger,
        bus: Arc<InMemoryEventBus>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            bus,
            clock,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Build the ledger from configuration, including bootstrap grants.
    pub fn from_config(
        config: &RuntimeConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, LedgerError> {
        let (ledger, granted) = SubsidyLedger::bootstrap(config, clock.now())?;
        debug!(grants = granted.len(), "Bootstrap grants applied before bus start");
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        Ok(Self::new(ledger, bus, clock))
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Subscribe to committed events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Log every committed event from now on.
    ///
    /// The task ends once the last clone of the service is dropped and
    /// every event published before that has been logged. It returns the
    /// number of events logged.
    #[must_use]
    pub fn spawn_event_logger(&self) -> JoinHandle<u64> {
        let mut events = self.subscribe(EventFilter::all()).into_stream();
        tokio::spawn(async move {
            let mut logged = 0;
            while let Some(event) = events.next().await {
                info!(
                    topic = ?event.topic(),
                    operation = %event.operation(),
                    actor = %event.actor(),
                    items = ?event.item_ids(),
                    batch_id = ?event.batch_id(),
                    stage = ?event.stage(),
                    "Event committed"
                );
                logged += 1;
            }
            logged
        })
    }

    // =========================================================================
    // COMMIT PATH
    // =========================================================================

    /// Run `apply` under the write guard and publish its event before the
    /// guard is released.
    async fn commit<R, F>(&self, operation: Operation, apply: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut SubsidyLedger, Timestamp) -> Result<(R, Option<SubsidyEvent>), LedgerError>,
    {
        let correlation_id = Uuid::new_v4();
        Span::current().record("correlation_id", tracing::field::display(correlation_id));

        let mut ledger = self.ledger.write().await;
        let now = self.clock.now();

        match apply(&mut ledger, now) {
            Ok((result, event)) => {
                let published = event.is_some();
                if let Some(event) = event {
                    let receivers = self.bus.publish(event).await;
                    debug!(%operation, receivers, "Committed event published");
                }
                drop(ledger);

                let mut stats = self.stats.write().await;
                stats.operations_committed += 1;
                if published {
                    stats.events_published += 1;
                }
                Ok(result)
            }
            Err(error) => {
                drop(ledger);
                warn!(%operation, kind = %error.kind(), %error, "Operation rejected");

                let mut stats = self.stats.write().await;
                stats.operations_rejected += 1;
                if error.kind() == ErrorKind::Unauthorized {
                    stats.unauthorized_attempts += 1;
                }
                Err(error)
            }
        }
    }

    // =========================================================================
    // ROLES
    // =========================================================================

    /// Grant `role` to `principal`. Returns whether membership changed.
    #[instrument(skip(self), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn grant_role(
        &self,
        caller: Principal,
        role: Role,
        principal: Principal,
    ) -> Result<bool, LedgerError> {
        self.commit(Operation::GrantRole, |ledger, now| {
            let event = ledger.grant_role(caller, role, principal, now)?;
            Ok((event.is_some(), event))
        })
        .await
    }

    /// Revoke `role` from `principal`. Returns whether membership changed.
    #[instrument(skip(self), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn revoke_role(
        &self,
        caller: Principal,
        role: Role,
        principal: Principal,
    ) -> Result<bool, LedgerError> {
        self.commit(Operation::RevokeRole, |ledger, now| {
            let event = ledger.revoke_role(caller, role, principal, now)?;
            Ok((event.is_some(), event))
        })
        .await
    }

    /// Drop `role` from the caller. Returns whether membership changed.
    #[instrument(skip(self), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn renounce_role(&self, caller: Principal, role: Role) -> Result<bool, LedgerError> {
        self.commit(Operation::RenounceRole, |ledger, now| {
            let event = ledger.renounce_role(caller, role, now)?;
            Ok((event.is_some(), event))
        })
        .await
    }

    /// Membership query.
    pub async fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.ledger.read().await.has_role(role, principal)
    }

    /// Sorted members of `role`.
    pub async fn members(&self, role: Role) -> Vec<Principal> {
        self.ledger.read().await.members(role)
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    /// Register a new item and return its id.
    #[instrument(skip(self), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn create_item(
        &self,
        caller: Principal,
        beneficiary: Principal,
    ) -> Result<ItemId, LedgerError> {
        self.commit(Operation::CreateItem, |ledger, now| {
            let (item_id, event) = ledger.create_item(caller, beneficiary, now)?;
            Ok((item_id, Some(event)))
        })
        .await
    }

    /// Created → Processed.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn process_item(
        &self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::ProcessItem, |ledger, now| {
            emitted(ledger.process_item(caller, item_id, uri, now))
        })
        .await
    }

    /// Processed → Transported.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn transport_item(
        &self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::TransportItem, |ledger, now| {
            emitted(ledger.transport_item(caller, item_id, uri, now))
        })
        .await
    }

    /// Transported → Distributed.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn distribute_item(
        &self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::DistributeItem, |ledger, now| {
            emitted(ledger.distribute_item(caller, item_id, uri, now))
        })
        .await
    }

    /// Distributed → Claimed.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn claim_subsidy(
        &self,
        caller: Principal,
        item_id: ItemId,
        uri: Option<&str>,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::ClaimSubsidy, |ledger, now| {
            emitted(ledger.claim_subsidy(caller, item_id, uri, now))
        })
        .await
    }

    /// Attach extra evidence to an item.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn add_document(
        &self,
        caller: Principal,
        item_id: ItemId,
        stage_tag: Stage,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::AddDocument, |ledger, now| {
            emitted(ledger.add_document(caller, item_id, stage_tag, uri, now))
        })
        .await
    }

    /// Append a free-form audit entry to an item.
    #[instrument(skip(self, action), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn log_action(
        &self,
        caller: Principal,
        item_id: ItemId,
        action: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::LogAction, |ledger, now| {
            emitted(ledger.log_action(caller, item_id, action, now))
        })
        .await
    }

    /// Snapshot of an item.
    pub async fn item(&self, item_id: ItemId) -> Result<Item, LedgerError> {
        self.ledger.read().await.item(item_id)
    }

    /// Documents attached to an item.
    pub async fn documents(&self, item_id: ItemId) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.ledger.read().await.documents(item_id)
    }

    /// Audit log of an item.
    pub async fn logs(&self, item_id: ItemId) -> Result<Vec<LogEntry>, LedgerError> {
        self.ledger.read().await.logs(item_id)
    }

    /// Number of items created so far.
    pub async fn item_count(&self) -> u64 {
        self.ledger.read().await.item_count()
    }

    /// Items `beneficiary` can claim right now.
    pub async fn claimable_items(&self, beneficiary: Principal) -> Vec<ItemId> {
        self.ledger.read().await.claimable_items(beneficiary)
    }

    // =========================================================================
    // BATCHES
    // =========================================================================

    /// Group created items into a batch and return its id.
    #[instrument(skip(self, note), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn create_batch(
        &self,
        caller: Principal,
        item_ids: &[ItemId],
        note: &str,
    ) -> Result<BatchId, LedgerError> {
        self.commit(Operation::CreateBatch, |ledger, now| {
            let (batch_id, event) = ledger.create_batch(caller, item_ids, note, now)?;
            Ok((batch_id, Some(event)))
        })
        .await
    }

    /// Move a whole batch to Transported.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn transport_batch(
        &self,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::TransportBatch, |ledger, now| {
            emitted(ledger.transport_batch(caller, batch_id, uri, now))
        })
        .await
    }

    /// Move a whole batch to Distributed.
    #[instrument(skip(self, uri), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn distribute_batch(
        &self,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::DistributeBatch, |ledger, now| {
            emitted(ledger.distribute_batch(caller, batch_id, uri, now))
        })
        .await
    }

    /// Claim one member of a distributed batch.
    #[instrument(skip(self), fields(%caller, correlation_id = tracing::field::Empty))]
    pub async fn verify_individual_claim(
        &self,
        caller: Principal,
        batch_id: BatchId,
        item_id: ItemId,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.commit(Operation::VerifyIndividualClaim, |ledger, now| {
            emitted(ledger.verify_individual_claim(caller, batch_id, item_id, now))
        })
        .await
    }

    /// Snapshot of a batch.
    pub async fn batch(&self, batch_id: BatchId) -> Result<Batch, LedgerError> {
        self.ledger.read().await.batch(batch_id)
    }

    /// Batch-level documents.
    pub async fn batch_documents(
        &self,
        batch_id: BatchId,
    ) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.ledger.read().await.batch_documents(batch_id)
    }

    /// Batch-level audit log.
    pub async fn batch_logs(&self, batch_id: BatchId) -> Result<Vec<LogEntry>, LedgerError> {
        self.ledger.read().await.batch_logs(batch_id)
    }

    /// Number of batches created so far.
    pub async fn batch_count(&self) -> u64 {
        self.ledger.read().await.batch_count()
    }
}

fn emitted(
    result: Result<SubsidyEvent, LedgerError>,
) -> Result<(SubsidyEvent, Option<SubsidyEvent>), LedgerError> {
    result.map(|event| (event.clone(), Some(event)))
}
