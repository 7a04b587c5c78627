//! Registry of bridge vendor contracts.
//!
//! Adapter configs name their vendor by contract address. The registry maps
//! `(domain, address)` to the vendor bridge deployed there.

use crate::config::LiquidityLayerConfig;
use crate::core_deployment::CoreDeployment;
use crate::errors::DeployError;
use ll_01_bridge_adapters::{BridgeAdapterType, InMemoryVendorBridge, VendorBridge};
use shared_types::{short_hex, Address, ChainMap, Domain};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Vendor bridges by deployment address.
#[derive(Default)]
pub struct VendorRegistry {
    contracts: HashMap<(Domain, Address), Arc<InMemoryVendorBridge>>,
    vendors: BTreeMap<BridgeAdapterType, Arc<InMemoryVendorBridge>>,
}

impl VendorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `bridge` is deployed at `address` on `domain`.
    pub fn register(&mut self, domain: Domain, address: Address, bridge: Arc<InMemoryVendorBridge>) {
        debug!(
            domain,
            address = %short_hex(&address),
            vendor = %bridge.vendor(),
            "[ll-03] Vendor contract registered"
        );
        self.vendors.entry(bridge.vendor()).or_insert_with(|| bridge.clone());
        self.contracts.insert((domain, address), bridge);
    }

    /// Bridge deployed at `address` on `domain`.
    pub fn resolve(&self, domain: Domain, address: Address) -> Option<Arc<InMemoryVendorBridge>> {
        self.contracts.get(&(domain, address)).cloned()
    }

    /// First bridge registered for `vendor`.
    pub fn vendor(&self, vendor: BridgeAdapterType) -> Option<Arc<InMemoryVendorBridge>> {
        self.vendors.get(&vendor).cloned()
    }

    /// Simulate every vendor the configs reference.
    ///
    /// One `InMemoryVendorBridge` per vendor spans all chains. Each chain
    /// whose domain the config maps gets that vendor attached to its ledger
    /// and registered at the configured contract address.
    ///
    /// # Errors
    ///
    /// `UnknownChain` if a config names a chain the core deployment lacks.
    pub fn simulate(
        core: &CoreDeployment,
        configs: &ChainMap<LiquidityLayerConfig>,
    ) -> Result<Self, DeployError> {
        let mut registry = Self::new();
        for (chain, config) in configs {
            let core_chain = core
                .chain(chain)
                .ok_or_else(|| DeployError::UnknownChain(chain.clone()))?;

            for adapter in &config.bridge_adapter_configs {
                let vendor = registry
                    .vendors
                    .entry(adapter.adapter_type())
                    .or_insert_with(|| Arc::new(InMemoryVendorBridge::new(adapter.adapter_type())))
                    .clone();
                if let Some(vendor_domain) = adapter.vendor_domain_for(core_chain.domain) {
                    vendor.attach_chain(
                        vendor_domain,
                        core_chain.ledger.clone(),
                        adapter.token_address(),
                    );
                }
                registry.register(core_chain.domain, adapter.vendor_bridge_address(), vendor);
            }
        }
        Ok(registry)
    }
}
