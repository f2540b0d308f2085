//! # Runtime Configuration
//!
//! Who administers the ledger, the lockout policy and the event bus size.
//!
//! ## Requirements
//!
//! - `super_admin` MUST be set to a non-null principal
//! - Bootstrap grants are applied by the super admin at startup, so they
//!   show up in the audit trail like any other grant

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::{Principal, Role};
use std::env;
use thiserror::Error;
use ts_01_role_registry::LastAdminPolicy;

/// A role grant applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGrant {
    /// Role to grant.
    pub role: Role,
    /// Principal receiving it.
    pub principal: Principal,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Principal holding `SUPER_ADMIN` at initialization.
    pub super_admin: Principal,
    /// Whether the last `SUPER_ADMIN` may be removed.
    pub last_admin_policy: LastAdminPolicy,
    /// Events buffered per subscriber before the slowest lags.
    pub bus_capacity: usize,
    /// Grants applied by `super_admin` right after startup.
    pub bootstrap: Vec<RoleGrant>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            super_admin: Principal::ZERO,
            last_admin_policy: LastAdminPolicy::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            bootstrap: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No super admin configured.
    #[error("super admin is not set; provide TS_SUPER_ADMIN or --super-admin")]
    MissingSuperAdmin,

    /// A variable could not be parsed.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable or flag name.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The bus must buffer at least one event.
    #[error("bus capacity must be at least 1")]
    ZeroBusCapacity,
}

impl RuntimeConfig {
    /// Create a configuration for `super_admin` with defaults elsewhere.
    #[must_use]
    pub fn new(super_admin: Principal) -> Self {
        Self {
            super_admin,
            ..Self::default()
        }
    }

    /// Add a bootstrap grant.
    #[must_use]
    pub fn with_grant(mut self, role: Role, principal: Principal) -> Self {
        self.bootstrap.push(RoleGrant { role, principal });
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TS_SUPER_ADMIN`: super admin address (required before `validate`)
    /// - `TS_LAST_ADMIN_POLICY`: `protect` (default) or `allow`
    /// - `TS_BUS_CAPACITY`: events buffered per subscriber (default: 1000)
    /// - `TS_BOOTSTRAP_ROLES`: comma-separated `ROLE=0x...` grants
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("TS_SUPER_ADMIN") {
            config.super_admin = value.parse().map_err(|e| ConfigError::InvalidValue {
                key: "TS_SUPER_ADMIN",
                reason: format!("{e}"),
            })?;
        }

        if let Some(value) = lookup("TS_LAST_ADMIN_POLICY") {
            config.last_admin_policy =
                value
                    .parse()
                    .map_err(|reason| ConfigError::InvalidValue {
                        key: "TS_LAST_ADMIN_POLICY",
                        reason,
                    })?;
        }

        if let Some(value) = lookup("TS_BUS_CAPACITY") {
            config.bus_capacity = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TS_BUS_CAPACITY",
                reason: format!("'{value}' is not a number"),
            })?;
        }

        if let Some(value) = lookup("TS_BOOTSTRAP_ROLES") {
            config.bootstrap = parse_grants(&value)?;
        }

        Ok(config)
    }

    /// Validate configuration before starting the runtime.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the super admin is the null principal
    /// - the bus capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.super_admin.is_zero() {
            return Err(ConfigError::MissingSuperAdmin);
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        Ok(())
    }
}

/// Parse `ROLE=0x...,ROLE=0x...` into grants.
pub fn parse_grants(value: &str) -> Result<Vec<RoleGrant>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(parse_grant)
        .collect()
}

fn parse_grant(pair: &str) -> Result<RoleGrant, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "TS_BOOTSTRAP_ROLES",
        reason,
    };

    let (role, principal) = pair
        .split_once('=')
        .ok_or_else(|| invalid(format!("'{pair}' is not ROLE=ADDRESS")))?;
    let role = Role::from_name(role).ok_or_else(|| invalid(format!("unknown role '{role}'")))?;
    let principal = principal
        .trim()
        .parse()
        .map_err(|e| invalid(format!("{e}")))?;

    Ok(RoleGrant { role, principal })
}
