//! # TS-02 Evidence
//!
//! Append-only per-subject evidence: documents attached at transitions and
//! the audit log of every action, actor and time.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Domain only (no ports, consumed directly by the ledgers)
//!
//! ## Storage
//!
//! Each store keeps one arena `Vec` plus a per-subject index of arena
//! positions. Appends never move existing records and there is no deletion
//! or mutation path.
//!
//! ## Module Structure
//!
//! ```text
//! ts-02-evidence/
//! └── domain/
//!     ├── records.rs     # DocumentRecord, LogEntry
//!     ├── store.rs       # SubjectArena, DocumentStore, AuditLog
//!     └── validation.rs  # uri / action / note checks
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

// Re-exports
pub use domain::{
    validate_action, validate_note, validate_uri, AuditLog, DocumentRecord, DocumentStore,
    LogEntry, SubjectArena, MAX_ACTION_LEN, MAX_NOTE_LEN, MAX_URI_LEN,
};
