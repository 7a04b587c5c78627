//! Circle Bridge Adapter
//!
//! Burn-and-mint adapter. Circle assigns the transfer nonce when the burn is
//! accepted, so the correlation key is only known once `send` returns.

use super::adapter_core::{AdapterCore, AdapterParams};
use crate::domain::{
    BridgeAdapterError, BridgeAdapterType, CircleBridgeAdapterConfig, CorrelationKey,
    SendRequest, SentTransfer, SettlementState, VendorSettlement,
};
use crate::ports::{BridgeAdapterApi, SettlementReceiver, VendorBridge};
use async_trait::async_trait;
use shared_types::{Address, Domain, TokenId, U256};
use std::ops::Deref;
use std::sync::Arc;

/// Adapter for Circle's token messenger.
pub struct CircleBridgeAdapter {
    core: AdapterCore,
    message_transmitter: Address,
}

impl CircleBridgeAdapter {
    /// Create a Circle adapter from its chain configuration.
    pub fn new(
        params: AdapterParams,
        config: &CircleBridgeAdapterConfig,
        vendor: Arc<dyn VendorBridge>,
    ) -> Result<Self, BridgeAdapterError> {
        let mapping = config
            .circle_domain_mapping
            .iter()
            .map(|m| (m.hyperlane_domain, m.circle_domain))
            .collect();
        Ok(Self {
            core: AdapterCore::new(
                BridgeAdapterType::Circle,
                params,
                config.token_address,
                mapping,
                vendor,
            )?,
            message_transmitter: config.message_transmitter_address,
        })
    }

    /// Message transmitter the attestations are relayed through.
    pub fn message_transmitter(&self) -> Address {
        self.message_transmitter
    }
}

impl Deref for CircleBridgeAdapter {
    type Target = AdapterCore;

    fn deref(&self) -> &AdapterCore {
        &self.core
    }
}

#[async_trait]
impl BridgeAdapterApi for CircleBridgeAdapter {
    fn adapter_type(&self) -> BridgeAdapterType {
        BridgeAdapterType::Circle
    }

    fn address(&self) -> Address {
        self.core.address()
    }

    fn token(&self) -> TokenId {
        self.core.token()
    }

    fn preflight(&self, destination: Domain, token: TokenId) -> Result<(), BridgeAdapterError> {
        self.core.preflight(destination, token)
    }

    async fn send(&self, request: SendRequest) -> Result<SentTransfer, BridgeAdapterError> {
        self.core.send(request, None).await
    }

    fn receive(&self, key: CorrelationKey, amount: U256) -> Result<(), BridgeAdapterError> {
        self.core.receive(key, amount)
    }

    fn claim(&self, caller: Address, key: CorrelationKey) -> Result<U256, BridgeAdapterError> {
        self.core.claim(caller, key)
    }

    fn settlement_state(&self, key: &CorrelationKey) -> SettlementState {
        self.core.settlement_state(key)
    }
}

impl SettlementReceiver for CircleBridgeAdapter {
    fn settle(&self, settlement: VendorSettlement) -> Result<(), BridgeAdapterError> {
        self.core.settle(settlement)
    }
}
