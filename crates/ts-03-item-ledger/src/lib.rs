//! # TS-03 Item Ledger
//!
//! Per-item lifecycle state machine with evidence attachment.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (Domain; authorization through the
//! [`AccessControl`](ts_01_role_registry::AccessControl) port)
//!
//! ## Purpose
//!
//! - Register items for a beneficiary
//! - Advance them Created → Processed → Transported → Distributed → Claimed,
//!   one role-gated step at a time
//! - Attach one document and one audit entry atomically with each step
//!
//! ## Guarantees
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | No stage skip or regression | `Stage::can_transition_to` |
//! | Claim at most once | `claimed` checked before stage |
//! | All-or-nothing | every check precedes the first mutation |
//! | Batch members move together | item-level steps rejected once batched |
//!
//! ## Module Structure
//!
//! ```text
//! ts-03-item-ledger/
//! └── domain/          # Item, ItemLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

// Re-exports
pub use domain::{Item, ItemLedger};
