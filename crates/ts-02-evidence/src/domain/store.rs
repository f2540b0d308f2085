//! # Evidence Stores
//!
//! One arena per store plus a per-subject index of arena positions.

use super::records::{DocumentRecord, LogEntry};
use shared_types::RecordRef;
use std::collections::HashMap;

/// Append-only arena indexed by subject.
#[derive(Clone, Debug)]
pub struct SubjectArena<T> {
    records: Vec<T>,
    index: HashMap<RecordRef, Vec<usize>>,
}

impl<T: Clone> SubjectArena<T> {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a record for `subject`.
    pub fn push(&mut self, subject: RecordRef, record: T) {
        let position = self.records.len();
        self.records.push(record);
        self.index.entry(subject).or_default().push(position);
    }

    /// Records of `subject`, in append order.
    pub fn iter_subject(&self, subject: RecordRef) -> impl Iterator<Item = &T> + '_ {
        self.index
            .get(&subject)
            .into_iter()
            .flatten()
            .filter_map(|&position| self.records.get(position))
    }

    /// Owned copy of the records of `subject`.
    #[must_use]
    pub fn for_subject(&self, subject: RecordRef) -> Vec<T> {
        self.iter_subject(subject).cloned().collect()
    }
}

impl<T: Clone> Default for SubjectArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents attached to items and batches.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    arena: SubjectArena<DocumentRecord>,
}

impl DocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `record` to `subject`.
    pub fn append(&mut self, subject: RecordRef, record: DocumentRecord) {
        self.arena.push(subject, record);
    }

    /// Documents of `subject`, in attachment order.
    #[must_use]
    pub fn documents(&self, subject: RecordRef) -> Vec<DocumentRecord> {
        self.arena.for_subject(subject)
    }
}

/// Append-only audit log of items and batches.
#[derive(Clone, Debug, Default)]
pub struct AuditLog {
    arena: SubjectArena<LogEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` under its own subject.
    pub fn append(&mut self, entry: LogEntry) {
        self.arena.push(entry.subject, entry);
    }

    /// Entries of `subject`, in append order.
    #[must_use]
    pub fn entries(&self, subject: RecordRef) -> Vec<LogEntry> {
        self.arena.for_subject(subject)
    }
}
