//! Deployed liquidity layer.

use crate::config::LiquidityLayerConfig;
use ll_01_bridge_adapters::{
    BridgeAdapter, BridgeAdapterConfig, BridgeAdapterType, CircleBridgeAdapter, PortalBridgeAdapter,
};
use ll_02_router::LiquidityLayerRouter;
use shared_types::{ChainMap, ChainName, Domain};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Contracts deployed on one chain.
#[derive(Clone)]
pub struct LiquidityLayerContracts {
    /// Messaging domain.
    pub domain: Domain,
    /// The chain's router.
    pub router: Arc<LiquidityLayerRouter>,
    /// Adapters by vendor.
    pub adapters: BTreeMap<BridgeAdapterType, Arc<BridgeAdapter>>,
}

/// Handle to every router and adapter of a deployment.
///
/// Holds the only strong references to the adapters; vendors keep weak ones.
pub struct LiquidityLayerApp {
    contracts: ChainMap<LiquidityLayerContracts>,
    configs: ChainMap<LiquidityLayerConfig>,
}

impl LiquidityLayerApp {
    pub(crate) fn new(
        contracts: ChainMap<LiquidityLayerContracts>,
        configs: ChainMap<LiquidityLayerConfig>,
    ) -> Self {
        Self { contracts, configs }
    }

    /// Contracts on `chain`.
    pub fn get_contracts(&self, chain: &str) -> Option<&LiquidityLayerContracts> {
        self.contracts.get(chain)
    }

    /// Router on `chain`.
    pub fn router(&self, chain: &str) -> Option<Arc<LiquidityLayerRouter>> {
        self.contracts.get(chain).map(|c| c.router.clone())
    }

    /// Adapter for `adapter_type` on `chain`.
    pub fn adapter(
        &self,
        chain: &str,
        adapter_type: BridgeAdapterType,
    ) -> Option<Arc<BridgeAdapter>> {
        self.contracts.get(chain)?.adapters.get(&adapter_type).cloned()
    }

    /// Circle adapter on `chain`.
    pub fn circle_bridge_adapter(&self, chain: &str) -> Option<&CircleBridgeAdapter> {
        self.contracts
            .get(chain)?
            .adapters
            .get(&BridgeAdapterType::Circle)?
            .as_circle()
    }

    /// Portal adapter on `chain`.
    pub fn portal_adapter(&self, chain: &str) -> Option<&PortalBridgeAdapter> {
        self.contracts
            .get(chain)?
            .adapters
            .get(&BridgeAdapterType::Portal)?
            .as_portal()
    }

    /// Chains in the deployment.
    pub fn chains(&self) -> Vec<ChainName> {
        self.contracts.keys().cloned().collect()
    }

    /// Domain of `chain`.
    pub fn domain(&self, chain: &str) -> Option<Domain> {
        self.contracts.get(chain).map(|c| c.domain)
    }

    /// Adapter configs `chain` was deployed with.
    pub fn bridge_adapter_configs(&self, chain: &str) -> Option<&[BridgeAdapterConfig]> {
        self.configs
            .get(chain)
            .map(|c| c.bridge_adapter_configs.as_slice())
    }
}
