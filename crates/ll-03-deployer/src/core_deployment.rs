//! Messaging deployment the liquidity layer is built on.
//!
//! One mailbox and one token ledger per chain, joined by a `MailboxNetwork`
//! that relays dispatched messages when `process_messages` is called.

use crate::errors::DeployError;
use shared_transport::{InMemoryMailbox, MailboxNetwork, ProcessReport};
use shared_types::{ChainMap, ChainName, Domain, InMemoryTokenLedger};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// One chain of the core deployment.
#[derive(Clone)]
pub struct CoreChain {
    /// Messaging domain.
    pub domain: Domain,
    /// The chain's mailbox.
    pub mailbox: Arc<InMemoryMailbox>,
    /// The chain's token ledger.
    pub ledger: Arc<InMemoryTokenLedger>,
}

/// Mailboxes and ledgers for a set of named chains.
pub struct CoreDeployment {
    network: MailboxNetwork,
    chains: ChainMap<CoreChain>,
}

impl CoreDeployment {
    /// Deploy a mailbox and a ledger on every chain.
    ///
    /// # Errors
    ///
    /// `DuplicateDomain` if two chains share a domain.
    pub fn new(domains: &ChainMap<Domain>) -> Result<Self, DeployError> {
        Self::with_network(MailboxNetwork::new(), domains)
    }

    /// Deploy onto an existing relayer network.
    pub fn with_network(
        network: MailboxNetwork,
        domains: &ChainMap<Domain>,
    ) -> Result<Self, DeployError> {
        let mut seen: HashMap<Domain, &ChainName> = HashMap::new();
        for (chain, domain) in domains {
            if let Some(first) = seen.insert(*domain, chain) {
                return Err(DeployError::DuplicateDomain {
                    domain: *domain,
                    first: first.clone(),
                    second: chain.clone(),
                });
            }
        }

        let chains = domains
            .iter()
            .map(|(chain, domain)| {
                let core = CoreChain {
                    domain: *domain,
                    mailbox: network.add_domain(*domain),
                    ledger: Arc::new(InMemoryTokenLedger::new(*domain)),
                };
                (chain.clone(), core)
            })
            .collect();

        info!(chains = domains.len(), "[ll-03] Core deployment ready");
        Ok(Self { network, chains })
    }

    /// Chain names in order.
    pub fn chains(&self) -> Vec<ChainName> {
        self.chains.keys().cloned().collect()
    }

    /// Everything deployed on `chain`.
    pub fn chain(&self, chain: &str) -> Option<&CoreChain> {
        self.chains.get(chain)
    }

    /// Domain of `chain`.
    pub fn domain(&self, chain: &str) -> Option<Domain> {
        self.chains.get(chain).map(|c| c.domain)
    }

    /// Chain deployed on `domain`.
    pub fn chain_for_domain(&self, domain: Domain) -> Option<ChainName> {
        self.chains
            .iter()
            .find(|(_, c)| c.domain == domain)
            .map(|(name, _)| name.clone())
    }

    /// Mailbox on `chain`.
    pub fn mailbox(&self, chain: &str) -> Option<Arc<InMemoryMailbox>> {
        self.chains.get(chain).map(|c| c.mailbox.clone())
    }

    /// Token ledger on `chain`.
    pub fn ledger(&self, chain: &str) -> Option<Arc<InMemoryTokenLedger>> {
        self.chains.get(chain).map(|c| c.ledger.clone())
    }

    /// The relayer network.
    pub fn network(&self) -> &MailboxNetwork {
        &self.network
    }

    /// Relay every dispatched message once.
    pub async fn process_messages(&self) -> ProcessReport {
        self.network.process_messages().await
    }
}
