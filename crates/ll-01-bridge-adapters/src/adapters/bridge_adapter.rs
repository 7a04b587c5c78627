//! The closed set of adapters a router can own.

use super::circle::CircleBridgeAdapter;
use super::adapter_core::{AdapterCore, AdapterParams};
use super::portal::PortalBridgeAdapter;
use crate::domain::{
    BridgeAdapterConfig, BridgeAdapterError, BridgeAdapterType, CorrelationKey, SendRequest,
    SentTransfer, SettlementState, VendorSettlement,
};
use crate::ports::{BridgeAdapterApi, SettlementReceiver, VendorBridge};
use async_trait::async_trait;
use shared_types::{Address, Domain, TokenId, U256};
use std::sync::Arc;

/// A bridge adapter of any supported vendor.
pub enum BridgeAdapter {
    /// Circle burn-and-mint.
    Circle(CircleBridgeAdapter),
    /// Portal lock-and-release.
    Portal(PortalBridgeAdapter),
}

impl BridgeAdapter {
    /// Build the adapter described by `config`.
    pub fn from_config(
        params: AdapterParams,
        config: &BridgeAdapterConfig,
        vendor: Arc<dyn VendorBridge>,
    ) -> Result<Self, BridgeAdapterError> {
        Ok(match config {
            BridgeAdapterConfig::Circle(c) => {
                Self::Circle(CircleBridgeAdapter::new(params, c, vendor)?)
            }
            BridgeAdapterConfig::Portal(c) => {
                Self::Portal(PortalBridgeAdapter::new(params, c, vendor)?)
            }
        })
    }

    /// Shared settlement core.
    pub fn core(&self) -> &AdapterCore {
        match self {
            Self::Circle(a) => &**a,
            Self::Portal(a) => &**a,
        }
    }

    /// The Circle adapter, if this is one.
    pub fn as_circle(&self) -> Option<&CircleBridgeAdapter> {
        match self {
            Self::Circle(a) => Some(a),
            Self::Portal(_) => None,
        }
    }

    /// The Portal adapter, if this is one.
    pub fn as_portal(&self) -> Option<&PortalBridgeAdapter> {
        match self {
            Self::Portal(a) => Some(a),
            Self::Circle(_) => None,
        }
    }
}

#[async_trait]
impl BridgeAdapterApi for BridgeAdapter {
    fn adapter_type(&self) -> BridgeAdapterType {
        match self {
            Self::Circle(a) => a.adapter_type(),
            Self::Portal(a) => a.adapter_type(),
        }
    }

    fn address(&self) -> Address {
        self.core().address()
    }

    fn token(&self) -> TokenId {
        self.core().token()
    }

    fn preflight(&self, destination: Domain, token: TokenId) -> Result<(), BridgeAdapterError> {
        self.core().preflight(destination, token)
    }

    async fn send(&self, request: SendRequest) -> Result<SentTransfer, BridgeAdapterError> {
        match self {
            Self::Circle(a) => a.send(request).await,
            Self::Portal(a) => a.send(request).await,
        }
    }

    fn receive(&self, key: CorrelationKey, amount: U256) -> Result<(), BridgeAdapterError> {
        self.core().receive(key, amount)
    }

    fn claim(&self, caller: Address, key: CorrelationKey) -> Result<U256, BridgeAdapterError> {
        self.core().claim(caller, key)
    }

    fn settlement_state(&self, key: &CorrelationKey) -> SettlementState {
        self.core().settlement_state(key)
    }
}

impl SettlementReceiver for BridgeAdapter {
    fn settle(&self, settlement: VendorSettlement) -> Result<(), BridgeAdapterError> {
        match self {
            Self::Circle(a) => a.settle(settlement),
            Self::Portal(a) => a.settle(settlement),
        }
    }
}
