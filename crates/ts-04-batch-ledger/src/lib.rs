//! # TS-04 Batch Ledger
//!
//! Aggregation of items into batches that move together through the
//! intermediate stages, then disaggregation through individual claims.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (Domain; cascades into [`ItemLedger`](ts_03_item_ledger::ItemLedger))
//!
//! ## Cascade
//!
//! A batch operation is one logical step over N members. Every member
//! precondition is checked first; only then are the batch and all members
//! mutated. There is no partial cascade and no rollback path.
//!
//! ```text
//! create_batch ──▶ Processed ──transport_batch──▶ Transported
//!                                                     │
//!                               Distributed ◀──distribute_batch
//!                                    │
//!                 verify_individual_claim (one member at a time)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! ts-04-batch-ledger/
//! └── domain/          # Batch, BatchLedger, MAX_BATCH_SIZE
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

// Re-exports
pub use domain::{Batch, BatchLedger, MAX_BATCH_SIZE};
