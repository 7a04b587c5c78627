//! Error types for deployment.

use ll_01_bridge_adapters::{BridgeAdapterError, BridgeAdapterType};
use shared_types::{Address, ChainName, Domain};
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config file {path}: {error}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        error: String,
    },

    /// File is not valid TOML for a deployment.
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Deployment errors. All of them are raised before any contract is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// Chain is not part of the core deployment.
    #[error("Unknown chain: {0}")]
    UnknownChain(ChainName),

    /// Two chains share a domain.
    #[error("Domain {domain} is used by both {first} and {second}")]
    DuplicateDomain {
        /// Shared domain.
        domain: Domain,
        /// First chain using it.
        first: ChainName,
        /// Second chain using it.
        second: ChainName,
    },

    /// Chain configures the same vendor twice.
    #[error("Chain {chain} configures {adapter_type} more than once")]
    DuplicateAdapterType {
        /// Offending chain.
        chain: ChainName,
        /// Repeated vendor.
        adapter_type: BridgeAdapterType,
    },

    /// Domain table lacks a chain the adapter must reach.
    #[error("{adapter_type} mapping on {chain} has no entry for {peer} (domain {domain})")]
    MissingPeerDomainMapping {
        /// Chain whose table is incomplete.
        chain: ChainName,
        /// Vendor of the table.
        adapter_type: BridgeAdapterType,
        /// Chain missing from the table.
        peer: ChainName,
        /// Its domain.
        domain: Domain,
    },

    /// Domain table maps two domains to one vendor domain, or one domain twice.
    #[error("{adapter_type} mapping on {chain} is not one-to-one")]
    InvalidDomainMapping {
        /// Offending chain.
        chain: ChainName,
        /// Vendor of the table.
        adapter_type: BridgeAdapterType,
    },

    /// No vendor bridge is deployed at the configured address.
    #[error("No bridge contract at {address:?} on {chain}")]
    UnknownBridgeContract {
        /// Chain searched.
        chain: ChainName,
        /// Configured address.
        address: Address,
    },

    /// Configured address belongs to another vendor.
    #[error("Bridge contract on {chain} is {actual}, config expects {expected}")]
    VendorTypeMismatch {
        /// Chain searched.
        chain: ChainName,
        /// Vendor named by the config.
        expected: BridgeAdapterType,
        /// Vendor found at the address.
        actual: BridgeAdapterType,
    },

    /// Adapter construction failed.
    #[error("Adapter error: {0}")]
    Adapter(#[from] BridgeAdapterError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
