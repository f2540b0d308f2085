//! # Transparent-Subsidy Test Suite
//!
//! Unified test crate for behavior that spans several crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Staffed ledgers, well-known principals
//! └── integration/
//!     ├── scenarios.rs     # End-to-end workflow walkthroughs
//!     ├── properties.rs    # proptest invariants over random op sequences
//!     └── concurrency.rs   # Multi-task access through SubsidyService
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ts-tests
//!
//! # By category
//! cargo test -p ts-tests integration::scenarios::
//! cargo test -p ts-tests integration::properties::
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
