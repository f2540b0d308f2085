//! # Inbound Ports
//!
//! Membership query every gated operation depends on.

use shared_types::{Principal, Role};

/// Role membership query.
///
/// Ledgers take `&impl AccessControl` so they can be exercised against a
/// plain registry in tests and against the runtime aggregate in production.
pub trait AccessControl {
    /// Whether `principal` currently holds `role`.
    fn has_role(&self, role: Role, principal: Principal) -> bool;
}
