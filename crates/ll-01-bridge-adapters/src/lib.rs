//! # LL-01 Bridge Adapters
//!
//! Per-vendor token bridge adapters for the liquidity layer.
//!
//! **Subsystem ID:** 01  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Move tokens between chains over an external bridge vendor while the
//! router moves the accompanying message over the interchain transport. The
//! two rails are independent, so each transfer is tied to its settlement by a
//! deterministic correlation key:
//!
//! ```text
//!   origin chain                                   destination chain
//! ┌──────────────┐  initiate_transfer  ┌────────┐  settle   ┌──────────────┐
//! │ adapter.send │ ──────────────────▶ │ vendor │ ────────▶ │ adapter      │
//! └──────────────┘   (burn / lock)     └────────┘  (mint)   │  .receive    │
//!        │                                                  │  .claim ◀── router
//!        └── key = H(version, vendor, vendor domain, nonce) └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One settlement per key | `DuplicateSettlement`, under one lock |
//! | One claim per key | `AlreadyClaimed` |
//! | Claim only after settlement | `NotSettled` (retryable) |
//! | Only the owning router claims | `Unauthorized` |
//! | Settled funds stay reserved | free balance excludes pending settlements |
//!
//! ## Module Structure
//!
//! ```text
//! ll-01-bridge-adapters/
//! ├── domain/          # BridgeAdapterType, CorrelationKey, configs, errors
//! ├── algorithms/      # Key derivation, correlation index, settlement ledger
//! ├── ports/           # BridgeAdapterApi, VendorBridge, SettlementReceiver
//! └── adapters/        # Circle, Portal, BridgeAdapter, InMemoryVendorBridge
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    AdapterCore, AdapterParams, BridgeAdapter, CircleBridgeAdapter, InMemoryVendorBridge,
    PortalBridgeAdapter,
};
pub use algorithms::{
    derive_correlation_key, CorrelationIndex, SettlementLedger, CORRELATION_KEY_VERSION,
};
pub use domain::{
    invariant_free_balance, invariant_mapping_bijective, BridgeAdapterConfig, BridgeAdapterError,
    BridgeAdapterType, CircleBridgeAdapterConfig, CircleDomainMapping, CorrelationKey,
    PortalAdapterConfig, SendRequest, SentTransfer, SettlementRecord, SettlementState,
    TransferNonce, VendorDomain, VendorError, VendorSettlement, VendorTransfer,
    WormholeDomainMapping,
};
pub use ports::{BridgeAdapterApi, SettlementReceiver, VendorBridge};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
