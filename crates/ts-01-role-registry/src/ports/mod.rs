//! # Ports
//!
//! Read-only view of role membership consumed by the ledgers.

pub mod inbound;

pub use inbound::*;
