//! # Domain Entities
//!
//! Settlement records, vendor transfer messages and per-vendor adapter
//! configuration.

use super::errors::BridgeAdapterError;
use super::value_objects::{
    BridgeAdapterType, CorrelationKey, SettlementState, TransferNonce, VendorDomain,
};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Domain, TokenId, U256};

/// Settlement bookkeeping for one correlation key on the destination adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Key the settlement was credited against.
    pub key: CorrelationKey,
    /// Credited amount.
    pub amount: U256,
    /// Current state. Never `Unknown` once a record exists.
    pub state: SettlementState,
}

impl SettlementRecord {
    /// A freshly credited settlement.
    pub fn settled(key: CorrelationKey, amount: U256) -> Self {
        Self {
            key,
            amount,
            state: SettlementState::Settled,
        }
    }

    /// Move to `next`, refusing anything but forward transitions.
    pub fn transition_to(&mut self, next: SettlementState) -> Result<(), BridgeAdapterError> {
        if self.state.can_transition_to(next) {
            self.state = next;
            return Ok(());
        }
        Err(match (self.state, next) {
            (_, SettlementState::Settled) => BridgeAdapterError::DuplicateSettlement(self.key),
            (SettlementState::Claimed, _) => BridgeAdapterError::AlreadyClaimed(self.key),
            _ => BridgeAdapterError::NotSettled(self.key),
        })
    }
}

/// Outbound request to an adapter, issued by its router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRequest {
    /// Account whose escrowed funds are being bridged; refunded on failure.
    pub sender: Address,
    /// Destination domain.
    pub destination: Domain,
    /// Token to bridge.
    pub token: TokenId,
    /// Amount to bridge.
    pub amount: U256,
}

/// Result of a successful `send`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransfer {
    /// Key the destination will settle under.
    pub correlation_key: CorrelationKey,
    /// Vendor domain of the origin chain.
    pub origin_vendor_domain: VendorDomain,
    /// Vendor transfer nonce.
    pub nonce: TransferNonce,
}

/// A transfer as handed to a vendor bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorTransfer {
    /// Vendor domain the funds leave.
    pub origin_vendor_domain: VendorDomain,
    /// Vendor domain the funds arrive on.
    pub destination_vendor_domain: VendorDomain,
    /// Token on the origin chain.
    pub token: TokenId,
    /// Amount.
    pub amount: U256,
    /// Holder the vendor burns or locks from.
    pub burn_from: Address,
    /// Contract credited on the destination chain.
    pub mint_recipient: Address,
    /// Caller-assigned nonce; `None` lets the vendor assign one.
    pub nonce: Option<TransferNonce>,
}

/// A settlement notification delivered by a vendor to the destination adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSettlement {
    /// Vendor that settled.
    pub vendor: BridgeAdapterType,
    /// Vendor domain the funds left.
    pub origin_vendor_domain: VendorDomain,
    /// Vendor transfer nonce.
    pub nonce: TransferNonce,
    /// Contract credited on the destination chain.
    pub mint_recipient: Address,
    /// Credited amount.
    pub amount: U256,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// One row of the Circle domain table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleDomainMapping {
    /// Messaging domain.
    pub hyperlane_domain: Domain,
    /// Circle's number for the same chain.
    pub circle_domain: u32,
}

/// One row of the Wormhole domain table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormholeDomainMapping {
    /// Messaging domain.
    pub hyperlane_domain: Domain,
    /// Wormhole chain id for the same chain.
    pub wormhole_domain: u16,
}

/// Circle adapter configuration for one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleBridgeAdapterConfig {
    /// Token messenger contract.
    pub circle_bridge_address: Address,
    /// Message transmitter contract.
    pub message_transmitter_address: Address,
    /// Bridged token.
    pub token_address: TokenId,
    /// Messaging domain to Circle domain table.
    pub circle_domain_mapping: Vec<CircleDomainMapping>,
}

/// Portal adapter configuration for one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalAdapterConfig {
    /// Token portal contract.
    pub portal_bridge_address: Address,
    /// Bridged token.
    pub token_address: TokenId,
    /// Messaging domain to Wormhole chain id table.
    pub wormhole_domain_mapping: Vec<WormholeDomainMapping>,
}

/// Adapter configuration for one (chain, vendor) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeAdapterConfig {
    /// Circle burn-and-mint.
    Circle(CircleBridgeAdapterConfig),
    /// Portal lock-and-release.
    Portal(PortalAdapterConfig),
}

impl BridgeAdapterConfig {
    /// Vendor this entry configures.
    pub fn adapter_type(&self) -> BridgeAdapterType {
        match self {
            Self::Circle(_) => BridgeAdapterType::Circle,
            Self::Portal(_) => BridgeAdapterType::Portal,
        }
    }

    /// Bridged token.
    pub fn token_address(&self) -> TokenId {
        match self {
            Self::Circle(c) => c.token_address,
            Self::Portal(c) => c.token_address,
        }
    }

    /// Vendor contract the adapter calls into.
    pub fn vendor_bridge_address(&self) -> Address {
        match self {
            Self::Circle(c) => c.circle_bridge_address,
            Self::Portal(c) => c.portal_bridge_address,
        }
    }

    /// Domain table normalised to `(messaging domain, vendor domain)` rows.
    pub fn domain_mapping(&self) -> Vec<(Domain, VendorDomain)> {
        match self {
            Self::Circle(c) => c
                .circle_domain_mapping
                .iter()
                .map(|m| (m.hyperlane_domain, m.circle_domain))
                .collect(),
            Self::Portal(c) => c
                .wormhole_domain_mapping
                .iter()
                .map(|m| (m.hyperlane_domain, VendorDomain::from(m.wormhole_domain)))
                .collect(),
        }
    }

    /// Vendor domain mapped to `domain`, if any.
    pub fn vendor_domain_for(&self, domain: Domain) -> Option<VendorDomain> {
        self.domain_mapping()
            .into_iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, v)| v)
    }
}
