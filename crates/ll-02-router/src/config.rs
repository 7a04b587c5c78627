//! Configuration for the Liquidity Layer Router

use serde::{Deserialize, Serialize};
use shared_types::{Address, Domain};

/// Largest message body a router will dispatch.
pub const DEFAULT_MAX_BODY_LEN: usize = 64 * 1024;

/// Router configuration for one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Domain of the chain the router is deployed on.
    pub local_domain: Domain,
    /// Router contract address.
    pub address: Address,
    /// Account allowed to release escrowed transfers.
    pub owner: Address,
    /// Maximum body length accepted by `dispatch_with_tokens`
    #[serde(default = "default_max_body_len")]
    pub max_body_len: usize,
}

fn default_max_body_len() -> usize {
    DEFAULT_MAX_BODY_LEN
}

impl RouterConfig {
    /// Config with the default body limit.
    pub fn new(local_domain: Domain, address: Address, owner: Address) -> Self {
        Self {
            local_domain,
            address,
            owner,
            max_body_len: DEFAULT_MAX_BODY_LEN,
        }
    }
}
