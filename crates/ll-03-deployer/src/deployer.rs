//! Liquidity Layer Deployer

use crate::app::{LiquidityLayerApp, LiquidityLayerContracts};
use crate::config::LiquidityLayerConfig;
use crate::core_deployment::CoreDeployment;
use crate::errors::DeployError;
use crate::vendors::VendorRegistry;
use ll_01_bridge_adapters::{
    invariant_mapping_bijective, AdapterParams, BridgeAdapter, BridgeAdapterApi,
    BridgeAdapterConfig, BridgeAdapterType, InMemoryVendorBridge, VendorBridge,
};
use ll_02_router::{LiquidityLayerRouter, RouterConfig};
use shared_types::{contract_address, short_hex, ChainMap, ChainName, Domain};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Contract name the router address is derived from.
pub const ROUTER_CONTRACT: &str = "LiquidityLayerRouter";

/// Contract name an adapter address is derived from.
pub fn adapter_contract(adapter_type: BridgeAdapterType) -> &'static str {
    match adapter_type {
        BridgeAdapterType::Circle => "CircleBridgeAdapter",
        BridgeAdapterType::Portal => "PortalAdapter",
    }
}

/// A chain that passed validation.
struct ChainPlan<'a> {
    chain: &'a ChainName,
    domain: Domain,
    config: &'a LiquidityLayerConfig,
    adapters: Vec<(&'a BridgeAdapterConfig, Arc<InMemoryVendorBridge>)>,
}

/// Deploys routers and adapters for a set of chains.
pub struct LiquidityLayerDeployer<'a> {
    config: ChainMap<LiquidityLayerConfig>,
    core: &'a CoreDeployment,
    vendors: &'a VendorRegistry,
}

impl<'a> LiquidityLayerDeployer<'a> {
    /// Deployer for `config` on top of `core`, resolving vendor contracts in
    /// `vendors`.
    pub fn new(
        config: ChainMap<LiquidityLayerConfig>,
        core: &'a CoreDeployment,
        vendors: &'a VendorRegistry,
    ) -> Self {
        Self {
            config,
            core,
            vendors,
        }
    }

    /// Validate the config and deploy every chain.
    ///
    /// Nothing is deployed unless every chain validates.
    ///
    /// # Errors
    ///
    /// - `UnknownChain` if a chain is missing from the core deployment
    /// - `DuplicateAdapterType` if a chain configures one vendor twice
    /// - `InvalidDomainMapping` if a domain table is not one-to-one
    /// - `MissingPeerDomainMapping` if a table omits a chain running the same vendor
    /// - `UnknownBridgeContract` / `VendorTypeMismatch` if the vendor address does not resolve
    pub fn deploy(&self) -> Result<LiquidityLayerApp, DeployError> {
        let plans = self.validate()?;

        let mut contracts: ChainMap<LiquidityLayerContracts> = ChainMap::new();
        for plan in &plans {
            contracts.insert(plan.chain.clone(), self.deploy_chain(plan)?);
        }
        Self::enroll(&contracts);

        info!(chains = contracts.len(), "[ll-03] Liquidity layer deployed");
        Ok(LiquidityLayerApp::new(contracts, self.config.clone()))
    }

    fn validate(&self) -> Result<Vec<ChainPlan<'_>>, DeployError> {
        let mut domains = BTreeMap::new();
        for chain in self.config.keys() {
            let domain = self
                .core
                .domain(chain)
                .ok_or_else(|| DeployError::UnknownChain(chain.clone()))?;
            domains.insert(chain, domain);
        }

        let mut plans = Vec::with_capacity(self.config.len());
        for (chain, config) in &self.config {
            let domain = domains[chain];
            let mut seen = HashSet::new();
            let mut adapters = Vec::with_capacity(config.bridge_adapter_configs.len());

            for adapter in &config.bridge_adapter_configs {
                let adapter_type = adapter.adapter_type();
                if !seen.insert(adapter_type) {
                    return Err(DeployError::DuplicateAdapterType {
                        chain: chain.clone(),
                        adapter_type,
                    });
                }

                let mapping = adapter.domain_mapping();
                if !invariant_mapping_bijective(&mapping) {
                    return Err(DeployError::InvalidDomainMapping {
                        chain: chain.clone(),
                        adapter_type,
                    });
                }
                for (peer, peer_domain) in &domains {
                    let runs_vendor = self.config[*peer]
                        .bridge_adapter_configs
                        .iter()
                        .any(|c| c.adapter_type() == adapter_type);
                    if runs_vendor && !mapping.iter().any(|(d, _)| d == peer_domain) {
                        return Err(DeployError::MissingPeerDomainMapping {
                            chain: chain.clone(),
                            adapter_type,
                            peer: (*peer).clone(),
                            domain: *peer_domain,
                        });
                    }
                }

                let address = adapter.vendor_bridge_address();
                let vendor = self.vendors.resolve(domain, address).ok_or_else(|| {
                    DeployError::UnknownBridgeContract {
                        chain: chain.clone(),
                        address,
                    }
                })?;
                if vendor.vendor() != adapter_type {
                    return Err(DeployError::VendorTypeMismatch {
                        chain: chain.clone(),
                        expected: adapter_type,
                        actual: vendor.vendor(),
                    });
                }
                adapters.push((adapter, vendor));
            }

            plans.push(ChainPlan {
                chain,
                domain,
                config,
                adapters,
            });
        }
        Ok(plans)
    }

    fn deploy_chain(&self, plan: &ChainPlan<'_>) -> Result<LiquidityLayerContracts, DeployError> {
        let core = self
            .core
            .chain(plan.chain)
            .ok_or_else(|| DeployError::UnknownChain(plan.chain.clone()))?;
        let owner = plan.config.owner;
        let router_address = contract_address(plan.domain, &owner, ROUTER_CONTRACT);

        let router = Arc::new(LiquidityLayerRouter::new(
            RouterConfig::new(plan.domain, router_address, owner),
            core.mailbox.clone(),
            core.ledger.clone(),
        ));

        let mut adapters = BTreeMap::new();
        for (config, vendor) in &plan.adapters {
            let adapter_type = config.adapter_type();
            let params = AdapterParams {
                address: contract_address(plan.domain, &owner, adapter_contract(adapter_type)),
                local_domain: plan.domain,
                router: router_address,
                ledger: core.ledger.clone(),
            };
            let adapter = Arc::new(BridgeAdapter::from_config(
                params,
                config,
                vendor.clone(),
            )?);
            let receiver: Weak<BridgeAdapter> = Arc::downgrade(&adapter);
            vendor.register_receiver(
                adapter.core().local_vendor_domain(),
                adapter.address(),
                receiver,
            );
            router.set_adapter(adapter.clone());
            adapters.insert(adapter_type, adapter);

            debug!(
                chain = %plan.chain,
                adapter = %adapter_type,
                "[ll-03] Adapter deployed"
            );
        }

        core.mailbox.register_recipient(router_address, router.clone());
        info!(
            chain = %plan.chain,
            domain = plan.domain,
            router = %short_hex(&router_address),
            adapters = adapters.len(),
            "[ll-03] Router deployed"
        );

        Ok(LiquidityLayerContracts {
            domain: plan.domain,
            router,
            adapters,
        })
    }

    fn enroll(contracts: &ChainMap<LiquidityLayerContracts>) {
        for (chain, local) in contracts {
            for (peer, remote) in contracts {
                if chain == peer {
                    continue;
                }
                local
                    .router
                    .enroll_remote_router(remote.domain, remote.router.address());
                for (adapter_type, adapter) in &local.adapters {
                    if let Some(peer_adapter) = remote.adapters.get(adapter_type) {
                        adapter
                            .core()
                            .enroll_remote_adapter(remote.domain, peer_adapter.address());
                    }
                }
            }
        }
    }
}
