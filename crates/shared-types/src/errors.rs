//! # Error Types
//!
//! The single error type reported by every ledger operation.
//!
//! Variants carry the ids, stages and principal involved; [`ErrorKind`]
//! collapses them into the six stable kinds callers branch on.

use crate::entities::{BatchId, ItemId, Principal, Stage};
use crate::operations::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable classification of a [`LedgerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Wrong role or identity.
    Unauthorized,
    /// Current stage does not permit the operation (skips, re-transitions).
    InvalidStage,
    /// Unknown item or batch id.
    NotFound,
    /// The item has already been claimed.
    AlreadyClaimed,
    /// Malformed request (null beneficiary, empty uri, bad batch set).
    InvalidInput,
    /// Item is not a member of the referenced batch.
    NotMember,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::InvalidStage => "InvalidStage",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::AlreadyClaimed => "AlreadyClaimed",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NotMember => "NotMember",
        };
        f.write_str(name)
    }
}

/// Reference to a ledger record, used in `NotFound` errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordRef {
    /// An item id.
    Item(ItemId),
    /// A batch id.
    Batch(BatchId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Item(id) => write!(f, "item #{id}"),
            RecordRef::Batch(id) => write!(f, "batch #{id}"),
        }
    }
}

/// Errors returned by ledger operations.
///
/// Every operation is all-or-nothing: when one of these is returned, no
/// stage, document, log entry or cascade mutation has been committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller lacks the role or identity the operation requires.
    #[error("unauthorized: {principal} may not {operation}")]
    Unauthorized {
        /// Operation that was attempted.
        operation: Operation,
        /// Principal that attempted it.
        principal: Principal,
    },

    /// Item stage precondition failed.
    #[error("invalid stage for item #{item_id}: expected {expected}, found {actual}")]
    InvalidStage {
        /// Item whose stage was checked.
        item_id: ItemId,
        /// Stage the operation requires.
        expected: Stage,
        /// Stage the item is actually in.
        actual: Stage,
    },

    /// Batch stage precondition failed.
    #[error("invalid stage for batch #{batch_id}: expected {expected}, found {actual}")]
    InvalidBatchStage {
        /// Batch whose stage was checked.
        batch_id: BatchId,
        /// Stage the operation requires.
        expected: Stage,
        /// Stage the batch is actually in.
        actual: Stage,
    },

    /// Item-level transition attempted on an item moved by a batch.
    #[error("item #{item_id} is managed by batch #{batch_id}")]
    BatchManaged {
        /// Item that was targeted.
        item_id: ItemId,
        /// Batch that owns the item's transitions.
        batch_id: BatchId,
    },

    /// Unknown id.
    #[error("{0} not found")]
    NotFound(RecordRef),

    /// Claim attempted twice.
    #[error("item #{0} already claimed")]
    AlreadyClaimed(ItemId),

    /// Malformed request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Item is not part of the batch.
    #[error("item #{item_id} is not a member of batch #{batch_id}")]
    NotMember {
        /// Batch that was referenced.
        batch_id: BatchId,
        /// Item that was referenced.
        item_id: ItemId,
    },
}

impl LedgerError {
    /// Stable error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidStage { .. } | Self::InvalidBatchStage { .. } | Self::BatchManaged { .. } => {
                ErrorKind::InvalidStage
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyClaimed(_) => ErrorKind::AlreadyClaimed,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotMember { .. } => ErrorKind::NotMember,
        }
    }

    /// Shorthand for an `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(operation: Operation, principal: Principal) -> Self {
        Self::Unauthorized {
            operation,
            principal,
        }
    }

    /// Shorthand for an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}
