//! # Correlation Keys
//!
//! Deterministic pairing of an outbound transfer with its settlement.
//!
//! ## Derivation
//!
//! ```text
//! key = keccak256( version:u8 || adapter_tag:u8 || vendor_domain:u32be || nonce:u64be )
//! ```
//!
//! The adapter tag namespaces keys per vendor, so identical
//! `(domain, nonce)` pairs from two vendors never collide.

use crate::domain::{
    BridgeAdapterError, BridgeAdapterType, CorrelationKey, TransferNonce, VendorDomain,
};
use shared_types::keccak256;
use std::collections::HashMap;

/// Derivation version mixed into every key. Bump on any layout change.
pub const CORRELATION_KEY_VERSION: u8 = 1;

/// Derive the correlation key for a vendor transfer.
pub fn derive_correlation_key(
    adapter_type: BridgeAdapterType,
    origin_vendor_domain: VendorDomain,
    nonce: TransferNonce,
) -> CorrelationKey {
    let mut preimage = [0u8; 14];
    preimage[0] = CORRELATION_KEY_VERSION;
    preimage[1] = adapter_type.tag();
    preimage[2..6].copy_from_slice(&origin_vendor_domain.to_be_bytes());
    preimage[6..14].copy_from_slice(&nonce.to_be_bytes());
    CorrelationKey(keccak256(&preimage))
}

/// Keys observed through one adapter's settlement path.
#[derive(Debug)]
pub struct CorrelationIndex {
    adapter_type: BridgeAdapterType,
    entries: HashMap<CorrelationKey, (VendorDomain, TransferNonce)>,
}

impl CorrelationIndex {
    /// Empty index for `adapter_type`.
    pub fn new(adapter_type: BridgeAdapterType) -> Self {
        Self {
            adapter_type,
            entries: HashMap::new(),
        }
    }

    /// Vendor this index derives keys for.
    pub fn adapter_type(&self) -> BridgeAdapterType {
        self.adapter_type
    }

    /// Record `(origin_vendor_domain, nonce)` and return its key.
    ///
    /// Registering the same pair again yields the same key.
    ///
    /// # Errors
    ///
    /// `CorrelationCollision` if another pair already owns the derived key.
    pub fn register(
        &mut self,
        origin_vendor_domain: VendorDomain,
        nonce: TransferNonce,
    ) -> Result<CorrelationKey, BridgeAdapterError> {
        let key = derive_correlation_key(self.adapter_type, origin_vendor_domain, nonce);
        match self.entries.get(&key) {
            Some(&(d, n)) if (d, n) == (origin_vendor_domain, nonce) => Ok(key),
            Some(&(existing_domain, existing_nonce)) => {
                Err(BridgeAdapterError::CorrelationCollision {
                    key,
                    existing_domain,
                    existing_nonce,
                    domain: origin_vendor_domain,
                    nonce,
                })
            }
            None => {
                self.entries.insert(key, (origin_vendor_domain, nonce));
                Ok(key)
            }
        }
    }

    /// The pair a key was registered for.
    pub fn resolve(&self, key: &CorrelationKey) -> Option<(VendorDomain, TransferNonce)> {
        self.entries.get(key).copied()
    }

    /// Whether `key` was registered.
    pub fn contains(&self, key: &CorrelationKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_correlation_key(BridgeAdapterType::Circle, 0, 17);
        let b = derive_correlation_key(BridgeAdapterType::Circle, 0, 17);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_inputs_distinct_keys() {
        let mut seen = HashSet::new();
        for domain in 0..8u32 {
            for nonce in 0..128u64 {
                assert!(seen.insert(derive_correlation_key(
                    BridgeAdapterType::Portal,
                    domain,
                    nonce
                )));
            }
        }
    }

    #[test]
    fn test_vendors_are_isolated() {
        let circle = derive_correlation_key(BridgeAdapterType::Circle, 3, 42);
        let portal = derive_correlation_key(BridgeAdapterType::Portal, 3, 42);
        assert_ne!(circle, portal);

        let mut index = CorrelationIndex::new(BridgeAdapterType::Portal);
        index.register(3, 42).unwrap();
        assert!(!index.contains(&circle));
        assert!(index.contains(&portal));
    }

    #[test]
    fn test_domain_and_nonce_not_interchangeable() {
        // Fixed-width fields keep (1, 0) and (0, 1) apart.
        assert_ne!(
            derive_correlation_key(BridgeAdapterType::Circle, 1, 0),
            derive_correlation_key(BridgeAdapterType::Circle, 0, 1)
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut index = CorrelationIndex::new(BridgeAdapterType::Circle);
        let first = index.register(5, 9).unwrap();
        let second = index.register(5, 9).unwrap();
        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve(&first), Some((5, 9)));
    }

    #[test]
    fn test_resolve_unknown() {
        let index = CorrelationIndex::new(BridgeAdapterType::Circle);
        let key = derive_correlation_key(BridgeAdapterType::Circle, 1, 1);
        assert!(index.is_empty());
        assert_eq!(index.resolve(&key), None);
    }
}
