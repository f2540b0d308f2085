//! # Domain Module
//!
//! Evidence records, their append-only stores and input validation.

pub mod records;
pub mod store;
pub mod validation;

pub use records::*;
pub use store::*;
pub use validation::*;
