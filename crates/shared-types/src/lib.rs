//! # Shared Types Crate
//!
//! Identifiers, the interchain message envelope and the per-chain token
//! ledger shared by the transport, the bridge adapters and the router.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-crate type is defined here.
//! - **Canonical addressing**: all addresses are 32 bytes; 20-byte EVM
//!   addresses are left-padded.
//! - **Value accounting**: only the ledger mints or burns, so conservation can
//!   be checked from the outside.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ledger;

pub use entities::*;
pub use envelope::InterchainMessage;
pub use errors::*;
pub use ledger::InMemoryTokenLedger;
