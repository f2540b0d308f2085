//! # Ledger Aggregate
//!
//! Owns the role table and both ledgers and forwards every operation with
//! the registry as the access-control port.
//!
//! The aggregate is synchronous. `SubsidyService` wraps it in a lock.

use crate::config::{RoleGrant, RuntimeConfig};
use shared_bus::SubsidyEvent;
use shared_types::{BatchId, ItemId, LedgerError, Principal, Role, Stage, Timestamp};
use tracing::{debug, info};
use ts_01_role_registry::{AccessControl, LastAdminPolicy, RoleRegistry};
use ts_02_evidence::{DocumentRecord, LogEntry};
use ts_03_item_ledger::{Item, ItemLedger};
use ts_04_batch_ledger::{Batch, BatchLedger};

/// Roles, items and batches of one ledger instance.
#[derive(Debug)]
pub struct SubsidyLedger {
    roles: RoleRegistry,
    items: ItemLedger,
    batches: BatchLedger,
}

impl SubsidyLedger {
    /// Create an empty ledger administered by `super_admin`.
    pub fn new(super_admin: Principal, policy: LastAdminPolicy) -> Result<Self, LedgerError> {
        Ok(Self {
            roles: RoleRegistry::new(super_admin, policy)?,
            items: ItemLedger::new(),
            batches: BatchLedger::new(),
        })
    }

    /// Create a ledger from configuration and apply its bootstrap grants.
    ///
    /// Returns the ledger together with the events of the grants that
    /// changed membership.
    pub fn bootstrap(
        config: &RuntimeConfig,
        now: Timestamp,
    ) -> Result<(Self, Vec<SubsidyEvent>), LedgerError> {
        let mut ledger = Self::new(config.super_admin, config.last_admin_policy)?;
        let mut events = Vec::with_capacity(config.bootstrap.len());

        for RoleGrant { role, principal } in &config.bootstrap {
            if let Some(event) = ledger.grant_role(config.super_admin, *role, *principal, now)? {
                events.push(event);
            }
        }

        info!(
            super_admin = %config.super_admin,
            grants = events.len(),
            policy = %config.last_admin_policy,
            "Ledger bootstrapped"
        );
        Ok((ledger, events))
    }

    // =========================================================================
    // ROLES
    // =========================================================================

    /// Grant `role` to `principal`. `None` when nothing changed.
    pub fn grant_role(
        &mut self,
        caller: Principal,
        role: Role,
        principal: Principal,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.roles.grant_role(caller, role, principal, now)
    }

    /// Revoke `role` from `principal`. `None` when nothing changed.
    pub fn revoke_role(
        &mut self,
        caller: Principal,
        role: Role,
        principal: Principal,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.roles.revoke_role(caller, role, principal, now)
    }

    /// Drop `role` from the caller. `None` when the caller did not hold it.
    pub fn renounce_role(
        &mut self,
        caller: Principal,
        role: Role,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.roles.renounce_role(caller, role, now)
    }

    /// Membership query.
    #[must_use]
    pub fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.roles.has_role(role, principal)
    }

    /// Sorted members of `role`.
    #[must_use]
    pub fn members(&self, role: Role) -> Vec<Principal> {
        self.roles.members(role)
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    /// Register a new item for `beneficiary`.
    pub fn create_item(
        &mut self,
        caller: Principal,
        beneficiary: Principal,
        now: Timestamp,
    ) -> Result<(ItemId, SubsidyEvent), LedgerError> {
        self.items.create_item(&self.roles, caller, beneficiary, now)
    }

    /// Created → Processed, with processing evidence.
    pub fn process_item(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items.process_item(&self.roles, caller, item_id, uri, now)
    }

    /// Processed → Transported, with transport evidence.
    pub fn transport_item(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items
            .transport_item(&self.roles, caller, item_id, uri, now)
    }

    /// Transported → Distributed, with distribution evidence.
    pub fn distribute_item(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items
            .distribute_item(&self.roles, caller, item_id, uri, now)
    }

    /// Distributed → Claimed, by the beneficiary or an admin.
    pub fn claim_subsidy(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        uri: Option<&str>,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items
            .claim_subsidy(&self.roles, caller, item_id, uri, now)
    }

    /// Attach extra evidence to an item.
    pub fn add_document(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        stage_tag: Stage,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items
            .add_document(&self.roles, caller, item_id, stage_tag, uri, now)
    }

    /// Append a free-form audit entry to an item.
    pub fn log_action(
        &mut self,
        caller: Principal,
        item_id: ItemId,
        action: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.items
            .log_action(&self.roles, caller, item_id, action, now)
    }

    // =========================================================================
    // BATCHES
    // =========================================================================

    /// Group created items into a batch at Processed.
    pub fn create_batch(
        &mut self,
        caller: Principal,
        item_ids: &[ItemId],
        note: &str,
        now: Timestamp,
    ) -> Result<(BatchId, SubsidyEvent), LedgerError> {
        self.batches
            .create_batch(&self.roles, &mut self.items, caller, item_ids, note, now)
    }

    /// Move a whole batch to Transported.
    pub fn transport_batch(
        &mut self,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.batches
            .transport_batch(&self.roles, &mut self.items, caller, batch_id, uri, now)
    }

    /// Move a whole batch to Distributed.
    pub fn distribute_batch(
        &mut self,
        caller: Principal,
        batch_id: BatchId,
        uri: &str,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.batches
            .distribute_batch(&self.roles, &mut self.items, caller, batch_id, uri, now)
    }

    /// Claim one member of a distributed batch.
    pub fn verify_individual_claim(
        &mut self,
        caller: Principal,
        batch_id: BatchId,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<SubsidyEvent, LedgerError> {
        self.batches.verify_individual_claim(
            &self.roles,
            &mut self.items,
            caller,
            batch_id,
            item_id,
            now,
        )
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot of an item.
    pub fn item(&self, item_id: ItemId) -> Result<Item, LedgerError> {
        self.items.item(item_id).cloned()
    }

    /// Documents attached to an item.
    pub fn documents(&self, item_id: ItemId) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.items.documents(item_id)
    }

    /// Audit log of an item.
    pub fn logs(&self, item_id: ItemId) -> Result<Vec<LogEntry>, LedgerError> {
        self.items.logs(item_id)
    }

    /// Number of items created so far.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.item_count()
    }

    /// Snapshot of a batch.
    pub fn batch(&self, batch_id: BatchId) -> Result<Batch, LedgerError> {
        self.batches.batch(batch_id).cloned()
    }

    /// Batch-level documents.
    pub fn batch_documents(&self, batch_id: BatchId) -> Result<Vec<DocumentRecord>, LedgerError> {
        self.batches.batch_documents(batch_id)
    }

    /// Batch-level audit log.
    pub fn batch_logs(&self, batch_id: BatchId) -> Result<Vec<LogEntry>, LedgerError> {
        self.batches.batch_logs(batch_id)
    }

    /// Number of batches created so far.
    #[must_use]
    pub fn batch_count(&self) -> u64 {
        self.batches.batch_count()
    }

    /// Items the caller may claim right now: distributed, unclaimed and
    /// owned by `beneficiary`.
    #[must_use]
    pub fn claimable_items(&self, beneficiary: Principal) -> Vec<ItemId> {
        let claimable: Vec<ItemId> = self
            .items
            .items()
            .filter(|item| item.beneficiary == beneficiary && item.is_claimable())
            .map(|item| item.id)
            .collect();
        debug!(%beneficiary, count = claimable.len(), "Claimable items queried");
        claimable
    }
}
