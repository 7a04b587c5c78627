//! # Domain Invariants
//!
//! Business rules for bridge adapters.

use super::errors::BridgeAdapterError;
use super::value_objects::VendorDomain;
use shared_types::{Domain, U256};
use std::collections::HashSet;

/// Invariant: Settled funds are reserved.
///
/// An adapter may only bridge funds that do not back a pending settlement,
/// otherwise a later claim could find the settled amount gone.
pub fn invariant_free_balance(
    balance: U256,
    reserved: U256,
    amount: U256,
) -> Result<(), BridgeAdapterError> {
    let available = balance.saturating_sub(reserved);
    if available < amount {
        return Err(BridgeAdapterError::InsufficientBalance {
            available,
            required: amount,
        });
    }
    Ok(())
}

/// Invariant: Domain mapping is one-to-one.
///
/// Settlement resolves vendor domains back to messaging domains, so neither
/// side of the table may repeat.
pub fn invariant_mapping_bijective(mapping: &[(Domain, VendorDomain)]) -> bool {
    let mut domains = HashSet::new();
    let mut vendor_domains = HashSet::new();
    mapping
        .iter()
        .all(|(d, v)| domains.insert(*d) && vendor_domains.insert(*v))
}
