//! # Shared Types Crate
//!
//! This crate contains the ledger vocabulary used by every subsystem of the
//! subsidy workflow.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Principals, roles, stages and operation
//!   names are defined once here.
//! - **Stable Error Kinds**: Every subsystem reports failures through
//!   [`LedgerError`], whose [`ErrorKind`] lets orchestration tooling tell
//!   wrong-actor, wrong-time and already-done apart.

pub mod entities;
pub mod errors;
pub mod operations;

pub use entities::*;
pub use errors::*;
pub use operations::*;
