//! Deployment fixture shared by the integration flows.
//!
//! Every chain runs both vendors over the same token, so a test can pick any
//! (origin, destination, vendor) triple.

use ll_01_bridge_adapters::{
    BridgeAdapterConfig, BridgeAdapterType, CircleBridgeAdapterConfig, CircleDomainMapping,
    InMemoryVendorBridge, PortalAdapterConfig, WormholeDomainMapping,
};
use ll_02_router::{
    LiquidityLayerRouter, LiquidityLayerRouterApi, RouterError, TestLiquidityLayerMessageRecipient,
    TransferRequest,
};
use ll_03_deployer::{
    CoreDeployment, LiquidityLayerApp, LiquidityLayerConfig, LiquidityLayerDeployer,
    VendorRegistry,
};
use shared_transport::{MailboxNetwork, ProcessReport, RelayerConfig};
use shared_types::{Address, ChainMap, Domain, InMemoryTokenLedger, MessageId, TokenId, H256, U256};
use std::sync::Arc;

/// Two chains, as in the single-hop flows.
pub const TWO_CHAINS: [(&str, Domain); 2] = [("test1", 13371), ("test2", 13372)];

/// Three chains, for fan-out schedules.
pub const THREE_CHAINS: [(&str, Domain); 3] =
    [("test1", 13371), ("test2", 13372), ("test3", 13373)];

/// Token bridged by every vendor.
pub fn token() -> TokenId {
    H256::from_low_u64_be(0x70)
}

/// Router owner on every chain.
pub fn owner() -> Address {
    H256::from_low_u64_be(0xAA)
}

fn adapter_configs(domains: &[Domain]) -> Vec<BridgeAdapterConfig> {
    vec![
        BridgeAdapterConfig::Circle(CircleBridgeAdapterConfig {
            circle_bridge_address: H256::from_low_u64_be(0xC1),
            message_transmitter_address: H256::from_low_u64_be(0xC2),
            token_address: token(),
            circle_domain_mapping: domains
                .iter()
                .enumerate()
                .map(|(i, d)| CircleDomainMapping {
                    hyperlane_domain: *d,
                    circle_domain: i as u32,
                })
                .collect(),
        }),
        BridgeAdapterConfig::Portal(PortalAdapterConfig {
            portal_bridge_address: H256::from_low_u64_be(0xD1),
            token_address: token(),
            wormhole_domain_mapping: domains
                .iter()
                .enumerate()
                .map(|(i, d)| WormholeDomainMapping {
                    hyperlane_domain: *d,
                    wormhole_domain: 2 + 2 * i as u16,
                })
                .collect(),
        }),
    ]
}

/// A deployed liquidity layer plus everything underneath it.
pub struct Harness {
    /// Mailboxes and ledgers.
    pub core: CoreDeployment,
    /// Simulated vendors.
    pub vendors: VendorRegistry,
    /// Routers and adapters.
    pub app: LiquidityLayerApp,
}

impl Harness {
    /// Deploy both vendors on every chain in `chains`.
    pub fn deploy(chains: &[(&str, Domain)]) -> Self {
        Self::deploy_with_relayer(chains, RelayerConfig::default())
    }

    /// Deploy with a custom relayer retry budget.
    pub fn deploy_with_relayer(chains: &[(&str, Domain)], relayer: RelayerConfig) -> Self {
        let domains: Vec<Domain> = chains.iter().map(|(_, d)| *d).collect();
        let domain_map: ChainMap<Domain> =
            chains.iter().map(|(n, d)| (n.to_string(), *d)).collect();
        let configs: ChainMap<LiquidityLayerConfig> = chains
            .iter()
            .map(|(n, _)| {
                (
                    n.to_string(),
                    LiquidityLayerConfig {
                        owner: owner(),
                        bridge_adapter_configs: adapter_configs(&domains),
                    },
                )
            })
            .collect();

        let core = CoreDeployment::with_network(MailboxNetwork::with_config(relayer), &domain_map)
            .expect("core deployment");
        let vendors = VendorRegistry::simulate(&core, &configs).expect("vendor registry");
        let app = LiquidityLayerDeployer::new(configs, &core, &vendors)
            .deploy()
            .expect("liquidity layer deployment");
        Self { core, vendors, app }
    }

    /// Router on `chain`.
    pub fn router(&self, chain: &str) -> Arc<LiquidityLayerRouter> {
        self.app.router(chain).expect("router deployed")
    }

    /// Ledger on `chain`.
    pub fn ledger(&self, chain: &str) -> Arc<InMemoryTokenLedger> {
        self.core.ledger(chain).expect("ledger deployed")
    }

    /// Domain of `chain`.
    pub fn domain(&self, chain: &str) -> Domain {
        self.core.domain(chain).expect("chain deployed")
    }

    /// Simulated vendor for `adapter_type`.
    pub fn vendor(&self, adapter_type: BridgeAdapterType) -> Arc<InMemoryVendorBridge> {
        self.vendors.vendor(adapter_type).expect("vendor simulated")
    }

    /// Register a recording recipient at `address` on `chain`.
    pub fn recipient(
        &self,
        chain: &str,
        address: Address,
    ) -> Arc<TestLiquidityLayerMessageRecipient> {
        let hook = Arc::new(TestLiquidityLayerMessageRecipient::new());
        self.router(chain).register_recipient(address, hook.clone());
        hook
    }

    /// Mint `amount` to `account` on `chain` and approve the router for it.
    pub fn fund(&self, chain: &str, account: Address, amount: u64) {
        let ledger = self.ledger(chain);
        let router = self.router(chain).address();
        ledger
            .mint(token(), account, U256::from(amount))
            .expect("mint");
        let allowance = ledger.allowance(token(), account, router);
        ledger.approve(token(), account, router, allowance + U256::from(amount));
    }

    /// Dispatch `amount` and `body` from `sender` on `origin` to `recipient`
    /// on `destination`.
    #[allow(clippy::too_many_arguments)]
    pub async fn send(
        &self,
        origin: &str,
        sender: Address,
        destination: &str,
        recipient: Address,
        amount: u64,
        adapter_type: BridgeAdapterType,
        body: &[u8],
    ) -> Result<MessageId, RouterError> {
        self.router(origin)
            .dispatch_with_tokens(
                sender,
                TransferRequest {
                    destination: self.domain(destination),
                    recipient,
                    body: body.to_vec(),
                    token: token(),
                    amount: U256::from(amount),
                    adapter_type,
                },
            )
            .await
    }

    /// One relayer pass.
    pub async fn relay(&self) -> ProcessReport {
        self.core.process_messages().await
    }

    /// Deliver every queued settlement on both vendors.
    pub fn settle_all(&self) {
        for adapter_type in BridgeAdapterType::ALL {
            for result in self.vendor(adapter_type).settle_all() {
                result.expect("settlement accepted");
            }
        }
    }

    /// Supply of the bridged token summed over every chain.
    pub fn total_supply(&self) -> U256 {
        self.core
            .chains()
            .iter()
            .map(|c| self.ledger(c).total_supply(token()))
            .fold(U256::zero(), |acc, s| acc + s)
    }

    /// Token balance of `account` on `chain`.
    pub fn balance(&self, chain: &str, account: Address) -> U256 {
        self.ledger(chain).balance_of(token(), account)
    }

    /// Balance held by every router and adapter on every chain.
    pub fn contract_holdings(&self) -> U256 {
        let mut total = U256::zero();
        for chain in self.app.chains() {
            total += self.balance(&chain, self.router(&chain).address());
            for adapter_type in BridgeAdapterType::ALL {
                if let Some(adapter) = self.app.adapter(&chain, adapter_type) {
                    total += self.balance(&chain, adapter.core().address());
                }
            }
        }
        total
    }
}
