//! # Shared Bus - Event Bus for Ledger Observers
//!
//! Every committed ledger mutation produces one [`SubsidyEvent`]. The bus is
//! the sole channel through which downstream tooling (handoff QR workflow,
//! audit viewers) learns of changes; such tooling never reads ledger storage
//! directly.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Ledger       │                    │ Audit viewer │
//! │ service      │    publish()       │ QR handoff   │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SubsidyEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging subscribers drop.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
