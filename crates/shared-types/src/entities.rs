//! # Core Domain Entities
//!
//! Identity, role and lifecycle types shared by the role registry, the
//! evidence stores and both ledgers.
//!
//! ## Clusters
//!
//! - **Identity**: `Principal`, `Address`
//! - **Permissions**: `Role`
//! - **Lifecycle**: `Stage`, `ItemId`, `BatchId`, `Timestamp`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Sequential item identifier (first item is 1).
pub type ItemId = u64;

/// Sequential batch identifier (first batch is 1).
pub type BatchId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Authenticated actor identity used for role checks and ownership
/// comparison.
///
/// The all-zero address is the null principal; it never holds roles in
/// practice and is rejected as a beneficiary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal(pub Address);

impl Principal {
    /// The null principal.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create a principal from raw address bytes.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Returns true for the null principal.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &Address {
        &self.0
    }
}

impl From<Address> for Principal {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when a principal string is not a 20-byte hex address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid principal {0:?}: expected 0x-prefixed 40 hex characters")]
pub struct ParsePrincipalError(pub String);

impl FromStr for Principal {
    type Err = ParsePrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| ParsePrincipalError(s.to_string()))?;
        let address: Address = bytes
            .try_into()
            .map_err(|_| ParsePrincipalError(s.to_string()))?;
        Ok(Self(address))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CLUSTER B: PERMISSIONS
// =============================================================================

/// Named permission group controlling which operations a principal may
/// invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Assigned at initialization; grants and revokes every role.
    SuperAdmin,
    /// Relay role: may claim on behalf of beneficiaries and attach evidence
    /// for any stage.
    Admin,
    /// Creates items and batches, processes items.
    Processor,
    /// Moves processed goods.
    Transporter,
    /// Hands goods over to beneficiaries.
    Distributor,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Processor,
        Role::Transporter,
        Role::Distributor,
    ];

    /// Canonical role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Processor => "PROCESSOR",
            Role::Transporter => "TRANSPORTER",
            Role::Distributor => "DISTRIBUTOR",
        }
    }

    /// Look a role up by its canonical name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns true for the three roles that move goods along the chain.
    #[must_use]
    pub const fn is_workflow_role(&self) -> bool {
        matches!(self, Role::Processor | Role::Transporter | Role::Distributor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER C: LIFECYCLE
// =============================================================================

/// Position of an item in the lifecycle
/// Created → Processed → Transported → Distributed → Claimed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Stage {
    /// Registered by a processor, nothing done yet.
    #[default]
    Created = 0,
    /// Processing evidence attached.
    Processed = 1,
    /// Transport evidence attached.
    Transported = 2,
    /// Handed over to the distribution point.
    Distributed = 3,
    /// Claimed by (or for) the beneficiary. Terminal.
    Claimed = 4,
}

impl Stage {
    /// Every stage, in lifecycle order.
    pub const ALL: [Stage; 5] = [
        Stage::Created,
        Stage::Processed,
        Stage::Transported,
        Stage::Distributed,
        Stage::Claimed,
    ];

    /// The stage that directly follows this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Stage> {
        match self {
            Stage::Created => Some(Stage::Processed),
            Stage::Processed => Some(Stage::Transported),
            Stage::Transported => Some(Stage::Distributed),
            Stage::Distributed => Some(Stage::Claimed),
            Stage::Claimed => None,
        }
    }

    /// The stage that directly precedes this one, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Created => None,
            Stage::Processed => Some(Stage::Created),
            Stage::Transported => Some(Stage::Processed),
            Stage::Distributed => Some(Stage::Transported),
            Stage::Claimed => Some(Stage::Distributed),
        }
    }

    /// Check if transition is valid: exactly one step forward.
    #[must_use]
    pub fn can_transition_to(&self, next: Stage) -> bool {
        self.next() == Some(next)
    }

    /// Numeric stage code (0..=4).
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// The workflow role that owns evidence for this stage.
    ///
    /// `Claimed` has no owning role: the claim edge is gated by
    /// beneficiary-or-admin instead.
    #[must_use]
    pub const fn owning_role(&self) -> Option<Role> {
        match self {
            Stage::Created | Stage::Processed => Some(Role::Processor),
            Stage::Transported => Some(Role::Transporter),
            Stage::Distributed => Some(Role::Distributor),
            Stage::Claimed => None,
        }
    }

    /// Human readable stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Created => "Created",
            Stage::Processed => "Processed",
            Stage::Transported => "Transported",
            Stage::Distributed => "Distributed",
            Stage::Claimed => "Claimed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Stage {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stage::Created),
            1 => Ok(Stage::Processed),
            2 => Ok(Stage::Transported),
            3 => Ok(Stage::Distributed),
            4 => Ok(Stage::Claimed),
            other => Err(other),
        }
    }
}
