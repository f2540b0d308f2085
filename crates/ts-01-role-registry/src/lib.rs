//! # TS-01 Role Registry
//!
//! Role grant/revoke/check, independent of all other ledger state.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (Domain + Ports)
//!
//! ## Purpose
//!
//! - Keep one membership set per [`Role`](shared_types::Role)
//! - Let `SUPER_ADMIN` grant and revoke any role, idempotently
//! - Evaluate the authorization policy every ledger operation runs first
//!
//! ## Lockout
//!
//! Whether the last `SUPER_ADMIN` may be removed is configurable through
//! [`LastAdminPolicy`]; the default refuses.
//!
//! ## Module Structure
//!
//! ```text
//! ts-01-role-registry/
//! ├── domain/          # RoleRegistry, LastAdminPolicy, Action, authorize
//! └── ports/           # AccessControl
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;

// Re-exports
pub use domain::{authorize, Action, LastAdminPolicy, RoleRegistry};
pub use ports::AccessControl;
