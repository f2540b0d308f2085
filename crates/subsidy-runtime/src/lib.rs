//! # Subsidy Runtime
//!
//! Wires the role registry and both ledgers into one aggregate and serves
//! it to async callers.
//!
//! ## Architecture
//!
//! ```text
//! subsidy-node (stdin NDJSON)
//!        │
//!        ↓
//!   command::dispatch ──→ SubsidyService ──publish──→ InMemoryEventBus
//!                              │ (write guard)
//!                              ↓
//!                        SubsidyLedger
//!                ┌─────────────┼──────────────┐
//!                ↓             ↓              ↓
//!          RoleRegistry   ItemLedger ←── BatchLedger
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! subsidy-runtime/
//! ├── config.rs   # RuntimeConfig, ConfigError
//! ├── ledger.rs   # SubsidyLedger aggregate
//! ├── service.rs  # SubsidyService, ServiceStats
//! ├── command.rs  # wire Request/Response, dispatch, serve
//! ├── ports.rs    # TimeSource
//! └── main.rs     # subsidy-node binary
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod ledger;
pub mod ports;
pub mod service;

// Re-exports
pub use command::{dispatch, serve, Command, ErrorBody, Request, Response};
pub use config::{ConfigError, RoleGrant, RuntimeConfig};
pub use ledger::SubsidyLedger;
pub use ports::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use service::{ServiceStats, SubsidyService};
