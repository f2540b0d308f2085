//! # Operation Names
//!
//! Every externally invocable ledger operation, used to label authorization
//! failures, audit entries and published events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Add a principal to a role.
    GrantRole,
    /// Remove a principal from a role.
    RevokeRole,
    /// Caller drops its own role membership.
    RenounceRole,
    /// Register a new item for a beneficiary.
    CreateItem,
    /// Created → Processed.
    ProcessItem,
    /// Processed → Transported.
    TransportItem,
    /// Transported → Distributed.
    DistributeItem,
    /// Distributed → Claimed.
    ClaimSubsidy,
    /// Attach supplementary evidence without a stage change.
    AddDocument,
    /// Append a free-form custodial note to an item's audit log.
    LogAction,
    /// Aggregate Created items into a batch (cascades to Processed).
    CreateBatch,
    /// Batch Processed → Transported.
    TransportBatch,
    /// Batch Transported → Distributed.
    DistributeBatch,
    /// Claim a single batch member.
    VerifyIndividualClaim,
}

impl Operation {
    /// Canonical operation name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::GrantRole => "grantRole",
            Operation::RevokeRole => "revokeRole",
            Operation::RenounceRole => "renounceRole",
            Operation::CreateItem => "createItem",
            Operation::ProcessItem => "processItem",
            Operation::TransportItem => "transportItem",
            Operation::DistributeItem => "distributeItem",
            Operation::ClaimSubsidy => "claimSubsidy",
            Operation::AddDocument => "addDocument",
            Operation::LogAction => "logAction",
            Operation::CreateBatch => "createBatch",
            Operation::TransportBatch => "transportBatch",
            Operation::DistributeBatch => "distributeBatch",
            Operation::VerifyIndividualClaim => "verifyIndividualClaim",
        }
    }

    /// Returns true for operations acting on a batch record.
    #[must_use]
    pub const fn is_batch_operation(&self) -> bool {
        matches!(
            self,
            Operation::CreateBatch
                | Operation::TransportBatch
                | Operation::DistributeBatch
                | Operation::VerifyIndividualClaim
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
