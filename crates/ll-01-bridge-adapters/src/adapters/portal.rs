//! Portal Adapter
//!
//! Lock-and-release adapter. The portal takes a caller-supplied nonce, so the
//! adapter numbers its own transfers.

use super::adapter_core::{AdapterCore, AdapterParams};
use crate::domain::{
    BridgeAdapterError, BridgeAdapterType, CorrelationKey, PortalAdapterConfig, SendRequest,
    SentTransfer, SettlementState, TransferNonce, VendorDomain, VendorSettlement,
};
use crate::ports::{BridgeAdapterApi, SettlementReceiver, VendorBridge};
use async_trait::async_trait;
use shared_types::{Address, Domain, TokenId, U256};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Adapter for the token portal.
pub struct PortalBridgeAdapter {
    core: AdapterCore,
    next_nonce: AtomicU64,
}

impl PortalBridgeAdapter {
    /// Create a Portal adapter from its chain configuration.
    pub fn new(
        params: AdapterParams,
        config: &PortalAdapterConfig,
        vendor: Arc<dyn VendorBridge>,
    ) -> Result<Self, BridgeAdapterError> {
        let mapping = config
            .wormhole_domain_mapping
            .iter()
            .map(|m| (m.hyperlane_domain, VendorDomain::from(m.wormhole_domain)))
            .collect();
        Ok(Self {
            core: AdapterCore::new(
                BridgeAdapterType::Portal,
                params,
                config.token_address,
                mapping,
                vendor,
            )?,
            next_nonce: AtomicU64::new(0),
        })
    }

    /// Nonce the next transfer will carry.
    pub fn peek_nonce(&self) -> TransferNonce {
        self.next_nonce.load(Ordering::SeqCst)
    }
}

impl Deref for PortalBridgeAdapter {
    type Target = AdapterCore;

    fn deref(&self) -> &AdapterCore {
        &self.core
    }
}

#[async_trait]
impl BridgeAdapterApi for PortalBridgeAdapter {
    fn adapter_type(&self) -> BridgeAdapterType {
        BridgeAdapterType::Portal
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
        // Consumed even if the portal rejects; gaps are harmless.
        let nonce = self.next_nonce.fetch_add(1, Ordering::SeqCst);
        self.core.send(request, Some(nonce)).await
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

impl SettlementReceiver for PortalBridgeAdapter {
    fn settle(&self, settlement: VendorSettlement) -> Result<(), BridgeAdapterError> {
        self.core.settle(settlement)
    }
}
