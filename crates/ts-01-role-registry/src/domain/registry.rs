//! # Role Registry
//!
//! Membership table: one sorted set of principals per role.
//!
//! Grant and revoke are idempotent set mutations reserved to
//! `SUPER_ADMIN`. An event is produced only when membership actually
//! changes, so replaying a grant is harmless and silent.

use serde::{Deserialize, Serialize};
use shared_bus::SubsidyEvent;
use shared_types::{LedgerError, Operation, Principal, Role, Timestamp};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::ports::AccessControl;

/// What happens when an operation would leave no `SUPER_ADMIN`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastAdminPolicy {
    /// Reject the removal with `InvalidInput`.
    #[default]
    Protect,
    /// Permit it; the registry is then frozen for role management.
    Allow,
}

impl fmt::Display for LastAdminPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastAdminPolicy::Protect => f.write_str("protect"),
            LastAdminPolicy::Allow => f.write_str("allow"),
        }
    }
}

impl FromStr for LastAdminPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protect" => Ok(LastAdminPolicy::Protect),
            "allow" => Ok(LastAdminPolicy::Allow),
            other => Err(format!("unknown last-admin policy '{other}'")),
        }
    }
}

/// Role membership table.
#[derive(Clone, Debug)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Principal>>,
    policy: LastAdminPolicy,
}

impl RoleRegistry {
    /// Create a registry whose only member is `super_admin` holding
    /// `SUPER_ADMIN`.
    pub fn new(super_admin: Principal, policy: LastAdminPolicy) -> Result<Self, LedgerError> {
        if super_admin.is_zero() {
            return Err(LedgerError::invalid_input(
                "super admin must not be the null principal",
            ));
        }

        let mut members = BTreeMap::new();
        members.insert(Role::SuperAdmin, BTreeSet::from([super_admin]));

        info!(%super_admin, %policy, "Role registry initialized");
        Ok(Self { members, policy })
    }

    /// Add `principal` to `role`.
    ///
    /// Returns `Ok(None)` when the principal already held the role.
    pub fn grant_role(
        &mut self,
        caller: Principal,
        role: Role,
        principal: Principal,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.require_super_admin(Operation::GrantRole, caller)?;
        if principal.is_zero() {
            return Err(LedgerError::invalid_input(
                "cannot grant a role to the null principal",
            ));
        }

        if !self.members.entry(role).or_default().insert(principal) {
            debug!(%role, %principal, "Grant is a no-op, already a member");
            return Ok(None);
        }

        info!(%role, %principal, actor = %caller, "Role granted");
        Ok(Some(SubsidyEvent::RoleGranted {
            role,
            principal,
            actor: caller,
            timestamp: now,
        }))
    }

    /// Remove `principal` from `role`.
    ///
    /// Returns `Ok(None)` when the principal did not hold the role.
    pub fn revoke_role(
        &mut self,
        caller: Principal,
        role: Role,
        principal: Principal,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.require_super_admin(Operation::RevokeRole, caller)?;
        self.remove_member(Operation::RevokeRole, caller, role, principal, now)
    }

    /// The caller drops its own membership of `role`.
    pub fn renounce_role(
        &mut self,
        caller: Principal,
        role: Role,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        self.remove_member(Operation::RenounceRole, caller, role, caller, now)
    }

    /// Sorted members of `role`.
    #[must_use]
    pub fn members(&self, role: Role) -> Vec<Principal> {
        self.members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of principals holding `role`.
    #[must_use]
    pub fn member_count(&self, role: Role) -> usize {
        self.members.get(&role).map_or(0, BTreeSet::len)
    }

    fn require_super_admin(
        &self,
        operation: Operation,
        caller: Principal,
    ) -> Result<(), LedgerError> {
        if self.has_role(Role::SuperAdmin, caller) {
            return Ok(());
        }
        warn!(%caller, %operation, "Role management denied");
        Err(LedgerError::unauthorized(operation, caller))
    }

    fn remove_member(
        &mut self,
        operation: Operation,
        caller: Principal,
        role: Role,
        principal: Principal,
        now: Timestamp,
    ) -> Result<Option<SubsidyEvent>, LedgerError> {
        if !self.has_role(role, principal) {
            debug!(%role, %principal, "Removal is a no-op, not a member");
            return Ok(None);
        }

        if role == Role::SuperAdmin
            && self.policy == LastAdminPolicy::Protect
            && self.member_count(Role::SuperAdmin) == 1
        {
            return Err(LedgerError::invalid_input(
                "cannot remove the last super admin",
            ));
        }

        if let Some(set) = self.members.get_mut(&role) {
            set.remove(&principal);
        }

        info!(%role, %principal, actor = %caller, %operation, "Role removed");
        Ok(Some(SubsidyEvent::RoleRevoked {
            operation,
            role,
            principal,
            actor: caller,
            timestamp: now,
        }))
    }
}

impl AccessControl for RoleRegistry {
    fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(&principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ErrorKind;

    const ROOT: Principal = Principal::new([1; 20]);
    const ALICE: Principal = Principal::new([2; 20]);
    const MALLORY: Principal = Principal::new([0xEE; 20]);

    fn registry() -> RoleRegistry {
        RoleRegistry::new(ROOT, LastAdminPolicy::Protect).unwrap()
    }

    #[test]
    fn test_new_rejects_null_super_admin() {
        let err = RoleRegistry::new(Principal::ZERO, LastAdminPolicy::Protect).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut reg = registry();

        let first = reg.grant_role(ROOT, Role::Processor, ALICE, 1).unwrap();
        assert!(matches!(first, Some(SubsidyEvent::RoleGranted { .. })));
        assert!(reg.has_role(Role::Processor, ALICE));

        let second = reg.grant_role(ROOT, Role::Processor, ALICE, 2).unwrap();
        assert!(second.is_none());
        assert_eq!(reg.member_count(Role::Processor), 1);
    }

    #[test]
    fn test_grant_requires_super_admin() {
        let mut reg = registry();
        reg.grant_role(ROOT, Role::Admin, ALICE, 1).unwrap();

        // The relay role does not manage roles
        let err = reg.grant_role(ALICE, Role::Processor, MALLORY, 2).unwrap_err();
        assert_eq!(
            err,
            LedgerError::unauthorized(Operation::GrantRole, ALICE)
        );
        assert!(!reg.has_role(Role::Processor, MALLORY));
    }

    #[test]
    fn test_grant_rejects_null_principal() {
        let mut reg = registry();
        let err = reg
            .grant_role(ROOT, Role::Processor, Principal::ZERO, 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut reg = registry();
        reg.grant_role(ROOT, Role::Transporter, ALICE, 1).unwrap();

        let event = reg.revoke_role(ROOT, Role::Transporter, ALICE, 2).unwrap();
        assert!(matches!(
            event,
            Some(SubsidyEvent::RoleRevoked {
                operation: Operation::RevokeRole,
                ..
            })
        ));
        assert!(!reg.has_role(Role::Transporter, ALICE));

        assert!(reg
            .revoke_role(ROOT, Role::Transporter, ALICE, 3)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_last_super_admin_protected() {
        let mut reg = registry();

        let err = reg.revoke_role(ROOT, Role::SuperAdmin, ROOT, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = reg.renounce_role(ROOT, Role::SuperAdmin, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(reg.has_role(Role::SuperAdmin, ROOT));

        // With a second super admin the first may leave
        reg.grant_role(ROOT, Role::SuperAdmin, ALICE, 2).unwrap();
        assert!(reg.renounce_role(ROOT, Role::SuperAdmin, 3).unwrap().is_some());
        assert_eq!(reg.members(Role::SuperAdmin), vec![ALICE]);
    }

    #[test]
    fn test_last_super_admin_allowed() {
        let mut reg = RoleRegistry::new(ROOT, LastAdminPolicy::Allow).unwrap();

        assert!(reg.revoke_role(ROOT, Role::SuperAdmin, ROOT, 1).unwrap().is_some());
        assert_eq!(reg.member_count(Role::SuperAdmin), 0);

        // Nobody can manage roles anymore
        let err = reg.grant_role(ROOT, Role::Processor, ALICE, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_renounce_own_role() {
        let mut reg = registry();
        reg.grant_role(ROOT, Role::Distributor, ALICE, 1).unwrap();

        let event = reg.renounce_role(ALICE, Role::Distributor, 2).unwrap();
        assert_eq!(event.map(|e| e.actor()), Some(ALICE));
        assert!(!reg.has_role(Role::Distributor, ALICE));

        assert!(reg.renounce_role(MALLORY, Role::Distributor, 3).unwrap().is_none());
    }

    #[test]
    fn test_members_sorted() {
        let mut reg = registry();
        reg.grant_role(ROOT, Role::Processor, MALLORY, 1).unwrap();
        reg.grant_role(ROOT, Role::Processor, ALICE, 1).unwrap();

        assert_eq!(reg.members(Role::Processor), vec![ALICE, MALLORY]);
        assert!(reg.members(Role::Admin).is_empty());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Protect".parse::<LastAdminPolicy>(), Ok(LastAdminPolicy::Protect));
        assert_eq!(" allow ".parse::<LastAdminPolicy>(), Ok(LastAdminPolicy::Allow));
        assert!("lock".parse::<LastAdminPolicy>().is_err());
    }
}
