//! # Core Entities
//!
//! Primitive identifiers shared by every liquidity layer crate.
//!
//! ## Clusters
//!
//! - **Chain identity**: `Domain`, `ChainName`
//! - **Addressing**: `Address` (32-byte canonical), `TokenId`
//! - **Hashing**: `keccak256`, `MessageId`, deterministic contract addresses

use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

// Re-export the fixed-width primitives so downstream crates agree on one version.
pub use primitive_types::{H160, H256, U256};

// =============================================================================
// CLUSTER A: CHAIN IDENTITY
// =============================================================================

/// Unique identifier of a chain participating in the system.
///
/// Assigned at network configuration time and never changes.
pub type Domain = u32;

/// Human-readable chain name used as the key of per-chain maps (`"test1"`).
pub type ChainName = String;

/// Map keyed by chain name.
///
/// Ordered so that deployment and iteration are deterministic.
pub type ChainMap<T> = BTreeMap<ChainName, T>;

// =============================================================================
// CLUSTER B: ADDRESSING
// =============================================================================

/// A 32-byte canonical address.
///
/// 20-byte EVM addresses are left-padded with zeroes (see [`address_to_bytes32`]).
pub type Address = H256;

/// Identifier of a fungible token: the token contract's address on its chain.
pub type TokenId = Address;

/// Identifier of a dispatched interchain message.
pub type MessageId = H256;

/// Left-pad a 20-byte address into the 32-byte canonical form.
pub fn address_to_bytes32(address: H160) -> Address {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    H256(out)
}

/// Truncate a canonical address back to its 20-byte form.
///
/// Returns `None` if the upper 12 bytes are not zero.
pub fn bytes32_to_address(address: Address) -> Option<H160> {
    let bytes = address.as_bytes();
    if bytes[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(H160::from_slice(&bytes[12..]))
}

// =============================================================================
// CLUSTER C: HASHING
// =============================================================================

/// Keccak-256 over `data`.
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Deterministic contract address for `label` deployed by `deployer` on `domain`.
///
/// Stands in for CREATE2: the same inputs always yield the same address, and
/// different labels on the same chain never clash.
pub fn contract_address(domain: Domain, deployer: &Address, label: &str) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(b"ll-contract");
    hasher.update(domain.to_be_bytes());
    hasher.update(deployer.as_bytes());
    hasher.update(label.as_bytes());
    // Keep the EVM shape: upper 12 bytes zero.
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(&digest[12..]);
    H256(out)
}

/// Short hex rendering of a 32-byte value for log lines (`0xabcd..ef01`).
pub fn short_hex(value: &H256) -> String {
    let bytes = value.as_bytes();
    format!(
        "0x{}..{}",
        hex::encode(&bytes[..2]),
        hex::encode(&bytes[30..])
    )
}
