//! # Domain Value Objects
//!
//! Immutable value types for the bridge adapter layer.

use serde::{Deserialize, Serialize};
use shared_types::{short_hex, H256};
use std::fmt;
use std::str::FromStr;

/// A chain identifier in a bridge vendor's own numbering.
///
/// Vendors number chains independently of the messaging layer; adapters
/// translate with a per-chain mapping table.
pub type VendorDomain = u32;

/// Per-vendor transfer sequence number.
pub type TransferNonce = u64;

/// Closed set of supported bridge vendors.
///
/// Used as a routing key and as the namespace of correlation keys. New
/// vendors are added as new variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BridgeAdapterType {
    /// Burn-and-mint stablecoin bridge; the vendor assigns nonces.
    Circle,
    /// Lock-and-release token portal; the adapter assigns nonces.
    Portal,
}

impl BridgeAdapterType {
    /// Every supported vendor.
    pub const ALL: [BridgeAdapterType; 2] = [Self::Circle, Self::Portal];

    /// Stable one-byte tag mixed into correlation keys.
    ///
    /// Never renumber: a change here silently breaks pairing of in-flight
    /// transfers.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Circle => 0x01,
            Self::Portal => 0x02,
        }
    }

    /// Stable name used in envelopes and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Portal => "Portal",
        }
    }

    /// Look a vendor up by its tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for BridgeAdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BridgeAdapterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown bridge adapter type: {s}"))
    }
}

/// Identifier binding an outbound token transfer to its settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationKey(pub H256);

impl CorrelationKey {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_hex(&self.0))
    }
}

/// Settlement state machine for one correlation key.
///
/// ```text
/// Unknown ──receive──▶ Settled ──claim──▶ Claimed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementState {
    /// No settlement observed.
    #[default]
    Unknown,
    /// Funds credited to the adapter, waiting for the router.
    Settled,
    /// Funds released to the router.
    Claimed,
}

impl SettlementState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: SettlementState) -> bool {
        matches!(
            (self, next),
            (Self::Unknown, Self::Settled) | (Self::Settled, Self::Claimed)
        )
    }

    /// Whether nothing further can happen from the claim side.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unknown | Self::Claimed)
    }
}
