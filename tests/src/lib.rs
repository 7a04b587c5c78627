//! # Liquidity Layer Test Suite
//!
//! Cross-chain flows run against a full deployment: mailboxes, ledgers,
//! simulated vendors, routers and adapters on every chain.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # Deployment fixture
//!     ├── flows.rs          # Ordering, rejection, escrow, replay
//!     └── interleavings.rs  # Randomized schedules across both rails
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ll-tests
//! cargo test -p ll-tests integration::interleavings
//! ```

#![allow(dead_code)]

pub mod integration;
