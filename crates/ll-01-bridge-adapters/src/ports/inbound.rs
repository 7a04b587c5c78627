//! # Inbound Ports
//!
//! API trait defining what a bridge adapter can do for its router.

use crate::domain::{
    BridgeAdapterError, BridgeAdapterType, CorrelationKey, SendRequest, SentTransfer,
    SettlementState,
};
use async_trait::async_trait;
use shared_types::{Address, Domain, TokenId, U256};

/// Bridge adapter API - inbound port.
#[async_trait]
pub trait BridgeAdapterApi: Send + Sync {
    /// Vendor this adapter drives.
    fn adapter_type(&self) -> BridgeAdapterType;

    /// Adapter contract address.
    fn address(&self) -> Address;

    /// Token this adapter bridges.
    fn token(&self) -> TokenId;

    /// Check everything `send` checks before any funds move.
    fn preflight(&self, destination: Domain, token: TokenId) -> Result<(), BridgeAdapterError>;

    /// Hand escrowed funds to the vendor bridge.
    ///
    /// On vendor failure the escrow is returned to `request.sender`.
    async fn send(&self, request: SendRequest) -> Result<SentTransfer, BridgeAdapterError>;

    /// Credit a settlement observed through the vendor path.
    fn receive(&self, key: CorrelationKey, amount: U256) -> Result<(), BridgeAdapterError>;

    /// Release settled funds to the owning router, once.
    fn claim(&self, caller: Address, key: CorrelationKey) -> Result<U256, BridgeAdapterError>;

    /// Settlement state of `key`.
    fn settlement_state(&self, key: &CorrelationKey) -> SettlementState;
}
