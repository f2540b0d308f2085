//! # Domain Module
//!
//! The item record and the ledger that moves it through the lifecycle.

pub mod entities;
pub mod ledger;

pub use entities::*;
pub use ledger::*;
