//! # Batch Ledger
//!
//! Batch creation, batch-level cascades and individual (disaggregated)
//! claims. Member mutations go through the item ledger's cascade
//! primitives; this ledger owns only batch records and batch-level
//! evidence.

use shared_bus::SubsidyEvent;
use shared_types::{
    BatchId, ItemId, LedgerError, Operation, Principal, RecordRef, Stage, Timestamp,
};
use std::collections::HashSet;
use tracing::{debug, info};
use ts_01_role_registry::{authorize, AccessControl, Action};
use ts_02_evidence::{
    validate_note, validate_uri, AuditLog, DocumentRecord, DocumentStore, LogEntry,
};
use ts_03_item_ledger::ItemLedger;

use super::entities::{Batch, MAX_BATCH_SIZE};

/// The two batch-level cascades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BatchStep {
    Transport,
    Distribute,
}

impl BatchStep {
    fn operation(self) -> Operation {
        match self {
            BatchStep::Transport => Operation::TransportBatch,
            BatchStep::Distribute => Operation::DistributeBatch,
        }
    }

    fn action(self) -> Action {
        match self {
            BatchStep::Transport => Action::TransportBatch,
            BatchStep::Distribute => Action::DistributeBatch,
        }
    }

    fn target(self) -> Stage {
        match self {
            BatchStep::Transport => Stage::Transported,
            BatchStep::Distribute => Stage::Distributed,
        }
    }
}

/// All batches and their batch-level evidence.
#[derive(Clone, Debug, Default)]
pub struct BatchLedger {
    /// Arena of batches; batch `n` lives at index `n - 1`.
    batches: Vec<Batch>,
    documents: DocumentStore,
    logs: AuditLog,
}

impl BatchLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Group `item_ids` into a new batch at `Processed`.
    ///
    /// Requires PROCESSOR. The set must be non-empty, distinct and at most
    /// [`MAX_BATCH_SIZE`]; every member must exist, be unassigned and sit
    /// at `Created`. Each member moves to `Processed` with one log entry;
    /// the batch gets one batch-level entry.
    pub fn create_batch<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        items: &mut ItemLedger,
        caller: Principal,
        item_ids: &[ItemId],
        note: &str,
        now: Timestamp,
    ) -> Result<(BatchId, SubsidyEvent), LedgerError> {
        authorize(access, &Action::CreateBatch, caller)?;
        validate_note(note)?;
        Self::validate_member_set(item_ids)?;

        for &item_id in item_ids {
            if let Some(batch_id) = items.item(item_id)?.batch_id {
                return Err(LedgerError::invalid_input(format!(
                    "item #{item_id} already belongs to batch #{batch_id}"
                )));
            }
            items.check_advance(item_id, Stage::Processed)?;
        }

        let batch_id = self.batches.len() as BatchId + 1;
        for &item_id in item_ids {
            items.assign_batch(item_id, batch_id);
            items.apply_advance(
                item_id,
                Stage::Processed,
                Operation::CreateBatch,
                caller,
                None,
                now,
            );
        }
        self.batches.push(Batch {
            id: batch_id,
            member_item_ids: item_ids.to_vec(),
            stage: Stage::Processed,
            note: note.to_owned(),
            created_by: caller,
            created_at: now,
        });
        self.logs.append(LogEntry::new(
            RecordRef::Batch(batch_id),
            Operation::CreateBatch.as_str(),
            caller,
            now,
        ));

        info!(batch_id, members = item_ids.len(), note, actor = %caller, "Batch created");
        Ok((
            batch_id,
            SubsidyEvent::BatchCreated {
                batch_id,
                item_ids: item_ids.to_vec(),
                note: note.to_owned(),
                actor: caller,
                timestamp: now,
            },
        ))
    }

    /// Batch `Processed` → `Transported`, cascading to every member.
    /// Requires TRANSPORTER.
    pub fn transport_batch<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        items: &mut ItemLedger,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.cascade(
            access,
            items,
            caller,
            BatchStep::Transport,
            batch_id,
            uri,
            now,
        )
    }

    /// Batch `Transported` → `Distributed`, cascading to every member.
    /// Requires DISTRIBUTOR.
    pub fn distribute_batch<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        items: &mut ItemLedger,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.cascade(
            access,
            items,
            caller,
            BatchStep::Distribute,
            batch_id,
            uri,
            now,
        )
    }

    /// Claim one member of a distributed batch.
    ///
    /// Allowed for DISTRIBUTOR or the member's beneficiary. Check order:
    /// `NotFound` (batch), `Unauthorized`, `NotMember`, `AlreadyClaimed`,
    /// `InvalidStage` (batch, then member). Membership is only reported to
    /// callers entitled to the claim. The batch record and the other
    /// members are left untouched.
    pub fn verify_individual_claim<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        items: &mut ItemLedger,
        caller: Principal,
        batch_id: BatchId,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        let batch = self.batch(batch_id)?;
        let batch_stage = batch.stage;
        let is_member = batch.contains(item_id);

        // Unknown items have no beneficiary, so only DISTRIBUTOR gets past this
        let beneficiary = items
            .item(item_id)
            .map_or(Principal::ZERO, |member| member.beneficiary);
        authorize(access, &Action::VerifyIndividualClaim { beneficiary }, caller)?;
        if !is_member {
            return Err(LedgerError::NotMember { batch_id, item_id });
        }

        let member = items.item(item_id)?;
        if member.claimed {
            return Err(LedgerError::AlreadyClaimed(item_id));
        }
        if batch_stage != Stage::Distributed {
            return Err(LedgerError::InvalidBatchStage {
                batch_id,
                expected: Stage::Distributed,
                actual: batch_stage,
            });
        }
        items.check_claim(item_id)?;

        items.apply_claim(item_id, Operation::VerifyIndividualClaim, caller, None, now);

        info!(batch_id, item_id, %beneficiary, actor = %caller, "Batch member claimed");
        Ok(SubsidyEvent::SubsidyClaimed {
            operation: Operation::VerifyIndividualClaim,
            item_id,
            batch_id: Some(batch_id),
            beneficiary,
            actor: caller,
            document_uri: None,
            timestamp: now,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn cascade<A: AccessControl + ?Sized>(
        &mut self,
        access: &A,
        items: &mut ItemLedger,
        caller: Principal,
        step: BatchStep,
        batch_id: BatchId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        let operation = step.operation();
        let target = step.target();

        authorize(access, &step.action(), caller)?;
        validate_uri(uri)?;
        let batch = self.batch(batch_id)?;
        if !batch.stage.can_transition_to(target) {
            return Err(LedgerError::InvalidBatchStage {
                batch_id,
                expected: target.previous().unwrap_or_default(),
                actual: batch.stage,
            });
        }
        let members = batch.member_item_ids.clone();

        // Validate every member before the first mutation
        for &item_id in &members {
            items.check_advance(item_id, target)?;
        }

        for &item_id in &members {
            items.apply_advance(item_id, target, operation, caller, Some(uri), now);
        }
        if let Some(batch) = Self::slot(batch_id).and_then(|i| self.batches.get_mut(i)) {
            batch.stage = target;
        }
        let subject = RecordRef::Batch(batch_id);
        self.documents
            .append(subject, DocumentRecord::new(target, uri, caller, now));
        self.logs
            .append(LogEntry::new(subject, operation.as_str(), caller, now));

        info!(batch_id, stage = %target, members = members.len(), actor = %caller, %operation, "Batch advanced");
        Ok(SubsidyEvent::BatchAdvanced {
            operation,
            batch_id,
            item_ids: members,
            actor: caller,
            stage: target,
            document_uri: uri.to_owned(),
            timestamp: now,
        })
    }

    fn validate_member_set(item_ids: &[ItemId]) -> Result<(), LedgerError> {
        if item_ids.is_empty() {
            return Err(LedgerError::invalid_input("batch has no items"));
        }
        if item_ids.len() > MAX_BATCH_SIZE {
            return Err(LedgerError::invalid_input(format!(
                "batch has {} items, limit is {MAX_BATCH_SIZE}",
                item_ids.len()
            )));
        }
        let mut seen = HashSet::with_capacity(item_ids.len());
        if let Some(duplicate) = item_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(LedgerError::invalid_input(format!(
                "item #{duplicate} listed twice"
            )));
        }
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot of `batch_id`.
    pub fn batch(&self, batch_id: BatchId) -> Result<&Batch, LedgerError> {
        Self::slot(batch_id)
            .and_then(|i| self.batches.get(i))
            .ok_or(LedgerError::NotFound(RecordRef::Batch(batch_id)))
    }

    /// Batch-level documents of `batch_id`, in order.
    pub fn batch_documents(&self, batch_id: BatchId) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.batch(batch_id)?;
        debug!(batch_id, "Batch documents queried");
        Ok(self.documents.documents(RecordRef::Batch(batch_id)))
    }

    /// Batch-level audit log of `batch_id`, in order.
    pub fn batch_logs(&self, batch_id: BatchId) -> Result<Vec<LogEntry>, LedgerError> {
        self.batch(batch_id)?;
        debug!(batch_id, "Batch logs queried");
        Ok(self.logs.entries(RecordRef::Batch(batch_id)))
    }

    /// Number of batches ever created. Also the highest id.
    #[must_use]
    pub fn batch_count(&self) -> u64 {
        self.batches.len() as u64
    }

    /// Every batch, in id order.
    pub fn batches(&self) -> impl Iterator<Item = &Batch> + '_ {
        self.batches.iter()
    }

    fn slot(batch_id: BatchId) -> Option<usize> {
        batch_id
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
    }
}
