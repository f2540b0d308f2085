//! # Domain Module
//!
//! The batch record and the ledger cascading batch steps into members.

pub mod entities;
pub mod ledger;

pub use entities::*;
pub use ledger::*;
