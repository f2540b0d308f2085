//! # Domain Module
//!
//! Role membership and the authorization policy evaluated against it.

pub mod policy;
pub mod registry;

pub use policy::*;
pub use registry::*;
