//! # Algorithms Module
//!
//! Correlation key derivation and settlement bookkeeping.

pub mod correlation;
pub mod settlement;

pub use correlation::{derive_correlation_key, CorrelationIndex, CORRELATION_KEY_VERSION};
pub use settlement::SettlementLedger;
