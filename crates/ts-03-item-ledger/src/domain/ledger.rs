//! # Item Ledger
//!
//! Per-item state machine:
//!
//! ```text
//! Created ──process──▶ Processed ──transport──▶ Transported
//!                                                    │
//!   Claimed ◀──claim (beneficiary / ADMIN)── Distributed ◀──distribute
//! ```
//!
//! Each edge is gated by exactly one role. Every operation checks all of
//! its preconditions before the first mutation, so a returned error means
//! nothing was committed.
//!
//! The `check_*` / `apply_*` pairs are the cascade primitives the batch
//! ledger uses to validate every member before touching any of them.

use shared_bus::SubsidyEvent;
use shared_types::{
    BatchId, ItemId, LedgerError, Operation, Principal, RecordRef, Stage, Timestamp,
};
use tracing::{debug, info};
use ts_01_role_registry::{authorize, AccessControl, Action};
use ts_02_evidence::{
    validate_action, validate_uri, AuditLog, DocumentRecord, DocumentStore, LogEntry,
};

use super::entities::Item;

// =============================================================================
// ITEM-LEVEL TRANSITIONS
// =============================================================================

/// The three role-gated intermediate edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Process,
    Transport,
    Distribute,
}

impl Step {
    fn operation(self) -> Operation {
        match self {
            Step::Process => Operation::ProcessItem,
            Step::Transport => Operation::TransportItem,
            Step::Distribute => Operation::DistributeItem,
        }
    }

    fn action(self) -> Action {
        match self {
            Step::Process => Action::ProcessItem,
            Step::Transport => Action::TransportItem,
            Step::Distribute => Action::DistributeItem,
        }
    }

    fn target(self) -> Stage {
        match self {
            Step::Process => Stage::Processed,
            Step::Transport => Stage::Transported,
            Step::Distribute => Stage::Distributed,
        }
    }
}

/// All items, their documents and their audit log.
#[derive(Clone, Debug, Default)]
pub struct ItemLedger {
    /// Arena of items; item `n` lives at index `n - 1`.
    items: Vec<Item>,
    documents: DocumentStore,
    logs: AuditLog,
}

impl ItemLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Register a new item for `beneficiary` at `Created`.
    ///
    /// Requires PROCESSOR. Fails `InvalidInput` for the null beneficiary.
    pub fn create_item<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        beneficiary: Principal,
        now: Timestamp,
    ) -> Result<(ItemId, SubsidyEvent), LedgerError> {
        authorize(access, &Action::CreateItem, caller)?;
        if beneficiary.is_zero() {
            return Err(LedgerError::invalid_input(
                "beneficiary must not be the null principal",
            ));
        }

        let item_id = self.items.len() as ItemId + 1;
        self.items.push(Item::new(item_id, beneficiary, now));
        self.logs.append(LogEntry::new(
            RecordRef::Item(item_id),
            Operation::CreateItem.as_str(),
            caller,
            now,
        ));

        info!(item_id, %beneficiary, actor = %caller, "Item created");
        Ok((
            item_id,
            SubsidyEvent::ItemCreated {
                item_id,
                beneficiary,
                actor: caller,
                timestamp: now,
            },
        ))
    }

    /// `Created` → `Processed`, attaching `uri`. Requires PROCESSOR.
    pub fn process_item<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.step(access, caller, Step::Process, item_id, uri, now)
    }

    /// `Processed` → `Transported`, attaching `uri`. Requires TRANSPORTER.
    pub fn transport_item<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.step(access, caller, Step::Transport, item_id, uri, now)
    }

    /// `Transported` → `Distributed`, attaching `uri`. Requires DISTRIBUTOR.
    pub fn distribute_item<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.step(access, caller, Step::Distribute, item_id, uri, now)
    }

    /// `Distributed` → `Claimed` by the beneficiary or an ADMIN relay.
    ///
    /// Check order: `NotFound`, `Unauthorized`, `InvalidInput` (bad uri),
    /// `AlreadyClaimed`, `InvalidStage`. A supplied `uri` is stored as a
    /// `Claimed`-tagged document.
    pub fn claim_subsidy<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        uri: Option<&str>,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        let beneficiary = self.item(item_id)?.beneficiary;
        authorize(access, &Action::ClaimSubsidy { beneficiary }, caller)?;
        if let Some(uri) = uri {
            validate_uri(uri)?;
        }
        let batch_id = self.check_claim(item_id)?.batch_id;

        self.apply_claim(item_id, Operation::ClaimSubsidy, caller, uri, now);

        info!(item_id, %beneficiary, actor = %caller, "Subsidy claimed");
        Ok(SubsidyEvent::SubsidyClaimed {
            operation: Operation::ClaimSubsidy,
            item_id,
            batch_id,
            beneficiary,
            actor: caller,
            document_uri: uri.map(str::to_owned),
            timestamp: now,
        })
    }

    /// Attach supplementary evidence without changing the stage.
    ///
    /// Allowed for the role owning `stage_tag`, or ADMIN.
    pub fn add_document<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        stage_tag: Stage,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        authorize(access, &Action::AddDocument { stage_tag }, caller)?;
        validate_uri(uri)?;
        self.item(item_id)?;

        let subject = RecordRef::Item(item_id);
        self.documents
            .append(subject, DocumentRecord::new(stage_tag, uri, caller, now));
        self.logs.append(LogEntry::new(
            subject,
            Operation::AddDocument.as_str(),
            caller,
            now,
        ));

        info!(item_id, %stage_tag, actor = %caller, "Document attached");
        Ok(SubsidyEvent::DocumentAttached {
            item_id,
            stage_tag,
            uri: uri.to_owned(),
            actor: caller,
            timestamp: now,
        })
    }

    /// Append a free-form custodial note ("Stored at warehouse") to the
    /// item's audit log.
    pub fn log_action<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        item_id: ItemId,
        action: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        authorize(access, &Action::LogAction, caller)?;
        validate_action(action)?;
        self.item(item_id)?;

        self.logs
            .append(LogEntry::new(RecordRef::Item(item_id), action, caller, now));

        info!(item_id, action, actor = %caller, "Action logged");
        Ok(SubsidyEvent::ActionLogged {
            item_id,
            action: action.to_owned(),
            actor: caller,
            timestamp: now,
        })
    }

    fn step<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        caller: Principal,
        step: Step,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        let operation = step.operation();
        let target = step.target();

        authorize(access, &step.action(), caller)?;
        validate_uri(uri)?;
        if let Some(batch_id) = self.item(item_id)?.batch_id {
            return Err(LedgerError::BatchManaged { item_id, batch_id });
        }
        self.check_advance(item_id, target)?;

        self.apply_advance(item_id, target, operation, caller, Some(uri), now);

        info!(item_id, stage = %target, actor = %caller, %operation, "Item advanced");
        Ok(SubsidyEvent::ItemAdvanced {
            operation,
            item_id,
            actor: caller,
            stage: target,
            document_uri: uri.to_owned(),
            timestamp: now,
        })
    }

    // =========================================================================
    // CASCADE PRIMITIVES
    // =========================================================================

    /// Check that `item_id` exists and sits exactly one stage before
    /// `target`. Pure.
    pub fn check_advance(&self, item_id: ItemId, target: Stage) -> Result<&Item, LedgerError> {
        let item = self.item(item_id)?;
        if item.stage.can_transition_to(target) && target != Stage::Claimed {
            return Ok(item);
        }
        Err(LedgerError::InvalidStage {
            item_id,
            expected: target.previous().unwrap_or_default(),
            actual: item.stage,
        })
    }

    /// Move `item_id` to `target`, appending a document when `uri` is given
    /// and one log entry naming `operation`.
    ///
    /// Only call after [`check_advance`](Self::check_advance) succeeded.
    pub fn apply_advance(
        &mut self,
        item_id: ItemId,
        target: Stage,
        operation: Operation,
        caller: Principal,
        uri: Option<&str>,
        now: Timestamp,
    ) {
        let Some(item) = Self::slot(item_id).and_then(|i| self.items.get_mut(i)) else {
            return;
        };
        item.stage = target;
        self.record(item_id, target, operation, caller, uri, now);
    }

    /// Check that `item_id` exists, is unclaimed and is `Distributed`. Pure.
    pub fn check_claim(&self, item_id: ItemId) -> Result<&Item, LedgerError> {
        let item = self.item(item_id)?;
        if item.claimed {
            return Err(LedgerError::AlreadyClaimed(item_id));
        }
        if item.stage != Stage::Distributed {
            return Err(LedgerError::InvalidStage {
                item_id,
                expected: Stage::Distributed,
                actual: item.stage,
            });
        }
        Ok(item)
    }

    /// Mark `item_id` claimed.
    ///
    /// Only call after [`check_claim`](Self::check_claim) succeeded.
    pub fn apply_claim(
        &mut self,
        item_id: ItemId,
        operation: Operation,
        caller: Principal,
        uri: Option<&str>,
        now: Timestamp,
    ) {
        let Some(item) = Self::slot(item_id).and_then(|i| self.items.get_mut(i)) else {
            return;
        };
        item.claimed = true;
        item.stage = Stage::Claimed;
        self.record(item_id, Stage::Claimed, operation, caller, uri, now);
    }

    /// Hand `item_id`'s intermediate transitions over to `batch_id`.
    pub fn assign_batch(&mut self, item_id: ItemId, batch_id: BatchId) {
        if let Some(item) = Self::slot(item_id).and_then(|i| self.items.get_mut(i)) {
            item.batch_id = Some(batch_id);
        }
    }

    fn record(
        &mut self,
        item_id: ItemId,
        stage_tag: Stage,
        operation: Operation,
        caller: Principal,
        uri: Option<&str>,
        now: Timestamp,
    ) {
        let subject = RecordRef::Item(item_id);
        if let Some(uri) = uri {
            self.documents
                .append(subject, DocumentRecord::new(stage_tag, uri, caller, now));
        }
        self.logs
            .append(LogEntry::new(subject, operation.as_str(), caller, now));
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot of `item_id`.
    pub fn item(&self, item_id: ItemId) -> Result<&Item, LedgerError> {
        Self::slot(item_id)
            .and_then(|i| self.items.get(i))
            .ok_or(LedgerError::NotFound(RecordRef::Item(item_id)))
    }

    /// Documents attached to `item_id`, in order.
    pub fn documents(&self, item_id: ItemId) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.item(item_id)?;
        debug!(item_id, "Documents queried");
        Ok(self.documents.documents(RecordRef::Item(item_id)))
    }

    /// Audit log of `item_id`, in order.
    pub fn logs(&self, item_id: ItemId) -> Result<Vec<LogEntry>, LedgerError> {
        self.item(item_id)?;
        debug!(item_id, "Logs queried");
        Ok(self.logs.entries(RecordRef::Item(item_id)))
    }

    /// Number of items ever created. Also the highest id.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.len() as u64
    }

    /// Every item, in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    fn slot(item_id: ItemId) -> Option<usize> {
        item_id
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
    }
}
