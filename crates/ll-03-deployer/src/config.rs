//! Deployment configuration.
//!
//! A deployment file names every chain, its messaging domain, and the
//! liquidity layer config for it.
//!
//! ```toml
//! [chains.test1]
//! domain = 13371
//! owner = "0x00000000000000000000000000000000000000000000000000000000000000aa"
//!
//! [[chains.test1.bridge_adapter_configs]]
//! type = "Circle"
//! circle_bridge_address = "0x…"
//! message_transmitter_address = "0x…"
//! token_address = "0x…"
//! circle_domain_mapping = [
//!     { hyperlane_domain = 13371, circle_domain = 0 },
//!     { hyperlane_domain = 13372, circle_domain = 1 },
//! ]
//! ```

use crate::errors::ConfigError;
use ll_01_bridge_adapters::BridgeAdapterConfig;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainMap, Domain};
use std::fs;
use std::path::Path;

/// Liquidity layer settings for one chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLayerConfig {
    /// Router owner.
    pub owner: Address,
    /// One entry per vendor deployed on the chain.
    #[serde(default)]
    pub bridge_adapter_configs: Vec<BridgeAdapterConfig>,
}

/// One chain in a deployment file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDeployment {
    /// Messaging domain.
    pub domain: Domain,
    /// Liquidity layer settings.
    #[serde(flatten)]
    pub liquidity_layer: LiquidityLayerConfig,
}

/// Parsed deployment file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLayerDeploymentFile {
    /// Chains by name.
    #[serde(default)]
    pub chains: ChainMap<ChainDeployment>,
}

impl LiquidityLayerDeploymentFile {
    /// Load a deployment from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse a deployment from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Render back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Chain name to domain.
    pub fn domains(&self) -> ChainMap<Domain> {
        self.chains
            .iter()
            .map(|(name, chain)| (name.clone(), chain.domain))
            .collect()
    }

    /// Chain name to liquidity layer config.
    pub fn configs(&self) -> ChainMap<LiquidityLayerConfig> {
        self.chains
            .iter()
            .map(|(name, chain)| (name.clone(), chain.liquidity_layer.clone()))
            .collect()
    }
}
