//! # Authorization Policy
//!
//! Maps a gated action, with the context it needs, to allow/deny against
//! the membership table. Every gated ledger operation calls [`authorize`]
//! before looking at any other state.
//!
//! | Action | Allowed callers |
//! |--------|-----------------|
//! | ManageRoles | SUPER_ADMIN |
//! | CreateItem, ProcessItem, CreateBatch | PROCESSOR |
//! | TransportItem, TransportBatch | TRANSPORTER |
//! | DistributeItem, DistributeBatch | DISTRIBUTOR |
//! | ClaimSubsidy | beneficiary, ADMIN |
//! | VerifyIndividualClaim | DISTRIBUTOR, beneficiary |
//! | AddDocument(tag) | owning role of tag, ADMIN |
//! | LogAction | any workflow role, ADMIN |

use shared_types::{LedgerError, Operation, Principal, Role, Stage};
use tracing::warn;

use crate::ports::AccessControl;

/// A gated action and the context its rule depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Grant or revoke a role.
    ManageRoles(Operation),
    /// Register an item.
    CreateItem,
    /// Created → Processed.
    ProcessItem,
    /// Processed → Transported.
    TransportItem,
    /// Transported → Distributed.
    DistributeItem,
    /// Claim an item.
    ClaimSubsidy {
        /// Beneficiary of the targeted item.
        beneficiary: Principal,
    },
    /// Attach supplementary evidence.
    AddDocument {
        /// Stage the evidence is tagged with.
        stage_tag: Stage,
    },
    /// Append a custodial note.
    LogAction,
    /// Aggregate items into a batch.
    CreateBatch,
    /// Batch Processed → Transported.
    TransportBatch,
    /// Batch Transported → Distributed.
    DistributeBatch,
    /// Claim one batch member.
    VerifyIndividualClaim {
        /// Beneficiary of the targeted member.
        beneficiary: Principal,
    },
}

impl Action {
    /// Operation name reported when the action is denied.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Action::ManageRoles(operation) => *operation,
            Action::CreateItem => Operation::CreateItem,
            Action::ProcessItem => Operation::ProcessItem,
            Action::TransportItem => Operation::TransportItem,
            Action::DistributeItem => Operation::DistributeItem,
            Action::ClaimSubsidy { .. } => Operation::ClaimSubsidy,
            Action::AddDocument { .. } => Operation::AddDocument,
            Action::LogAction => Operation::LogAction,
            Action::CreateBatch => Operation::CreateBatch,
            Action::TransportBatch => Operation::TransportBatch,
            Action::DistributeBatch => Operation::DistributeBatch,
            Action::VerifyIndividualClaim { .. } => Operation::VerifyIndividualClaim,
        }
    }

    /// Whether `caller` may perform this action.
    pub fn is_allowed<A: AccessControl + ?Sized>(&self, access: &A, caller: Principal) -> bool {
        match self {
            Action::ManageRoles(_) => access.has_role(Role::SuperAdmin, caller),
            Action::CreateItem | Action::ProcessItem | Action::CreateBatch => {
                access.has_role(Role::Processor, caller)
            }
            Action::TransportItem | Action::TransportBatch => {
                access.has_role(Role::Transporter, caller)
            }
            Action::DistributeItem | Action::DistributeBatch => {
                access.has_role(Role::Distributor, caller)
            }
            Action::ClaimSubsidy { beneficiary } => {
                is_beneficiary(caller, *beneficiary) || access.has_role(Role::Admin, caller)
            }
            Action::VerifyIndividualClaim { beneficiary } => {
                is_beneficiary(caller, *beneficiary) || access.has_role(Role::Distributor, caller)
            }
            Action::AddDocument { stage_tag } => {
                access.has_role(Role::Admin, caller)
                    || stage_tag
                        .owning_role()
                        .is_some_and(|role| access.has_role(role, caller))
            }
            Action::LogAction => Role::ALL
                .iter()
                .filter(|role| role.is_workflow_role() || **role == Role::Admin)
                .any(|role| access.has_role(*role, caller)),
        }
    }
}

/// The null principal is never anyone's beneficiary.
fn is_beneficiary(caller: Principal, beneficiary: Principal) -> bool {
    !caller.is_zero() && caller == beneficiary
}

/// Check `action` for `caller`, failing with `Unauthorized` on deny.
pub fn authorize<A: AccessControl + ?Sized>(
    access: &A,
    action: &Action,
    caller: Principal,
) -> Result<(), LedgerError> {
    if action.is_allowed(access, caller) {
        return Ok(());
    }

    let operation = action.operation();
    warn!(%caller, %operation, "Authorization denied");
    Err(LedgerError::unauthorized(operation, caller))
}
