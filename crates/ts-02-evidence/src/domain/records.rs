//! # Evidence Records
//!
//! Immutable once appended.

use serde::{Deserialize, Serialize};
use shared_types::{Principal, RecordRef, Stage, Timestamp};

/// Pointer to off-ledger evidence attached at a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stage the evidence relates to.
    pub stage_tag: Stage,
    /// Opaque content address (`ipfs://...`, `CID_A`, ...).
    pub uri: String,
    /// Principal that attached it.
    pub attached_by: Principal,
    /// Commit time.
    pub timestamp: Timestamp,
}

impl DocumentRecord {
    /// Create a record.
    pub fn new(
        stage_tag: Stage,
        uri: impl Into<String>,
        attached_by: Principal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            stage_tag,
            uri: uri.into(),
            attached_by,
            timestamp,
        }
    }
}

/// One audit log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Item or batch the action concerns.
    pub subject: RecordRef,
    /// What happened, e.g. `"processItem"` or a custodial note.
    pub action: String,
    /// Principal that performed it.
    pub performed_by: Principal,
    /// Commit time.
    pub timestamp: Timestamp,
}

impl LogEntry {
    /// Create an entry.
    pub fn new(
        subject: RecordRef,
        action: impl Into<String>,
        performed_by: Principal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            subject,
            action: action.into(),
            performed_by,
            timestamp,
        }
    }
}
