//! # Domain Errors
//!
//! Error types for the bridge adapter layer.
//!
//! ## Taxonomy
//!
//! | Class | Variants | Retry? |
//! |-------|----------|--------|
//! | Precondition | `InsufficientBalance`, `UnsupportedToken`, `UnsupportedDomain`, `NoRemoteAdapter` | no |
//! | Initiation | `TransferInitiationFailed` | no |
//! | Correlation | `UnknownCorrelationKey`, `DuplicateSettlement`, `AlreadyClaimed`, `CorrelationCollision`, `UnexpectedMintRecipient`, `VendorMismatch` | no |
//! | Timing | `NotSettled` | yes |
//! | Authorization | `Unauthorized` | no |

use super::value_objects::{BridgeAdapterType, CorrelationKey, TransferNonce, VendorDomain};
use shared_types::{Address, Domain, LedgerError, TokenId, U256};
use thiserror::Error;

/// Bridge adapter errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeAdapterError {
    /// Adapter does not hold enough unencumbered funds for the transfer.
    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        /// Funds not backing a pending settlement.
        available: U256,
        /// Requested amount.
        required: U256,
    },

    /// Token is not the one this adapter bridges.
    #[error("Unsupported token {token:?} for {adapter} adapter")]
    UnsupportedToken {
        /// Vendor.
        adapter: BridgeAdapterType,
        /// Offending token.
        token: TokenId,
    },

    /// Domain has no entry in the vendor domain mapping.
    #[error("Domain {domain} has no {adapter} domain mapping")]
    UnsupportedDomain {
        /// Vendor.
        adapter: BridgeAdapterType,
        /// Unmapped domain.
        domain: Domain,
    },

    /// Vendor domain has no entry in the mapping.
    #[error("{adapter} domain {vendor_domain} is not mapped")]
    UnsupportedVendorDomain {
        /// Vendor.
        adapter: BridgeAdapterType,
        /// Unmapped vendor domain.
        vendor_domain: VendorDomain,
    },

    /// No counterpart adapter is enrolled for the destination.
    #[error("No remote {adapter} adapter enrolled for domain {domain}")]
    NoRemoteAdapter {
        /// Vendor.
        adapter: BridgeAdapterType,
        /// Destination domain.
        domain: Domain,
    },

    /// Vendor refused to start the transfer.
    #[error("Transfer initiation failed: {0}")]
    TransferInitiationFailed(String),

    /// Settlement for a key that no vendor settlement ever announced.
    #[error("Unknown correlation key {0}")]
    UnknownCorrelationKey(CorrelationKey),

    /// Second settlement for the same key.
    #[error("Duplicate settlement for {0}")]
    DuplicateSettlement(CorrelationKey),

    /// Claim before settlement.
    #[error("Not settled: {0}")]
    NotSettled(CorrelationKey),

    /// Second claim for the same key.
    #[error("Already claimed: {0}")]
    AlreadyClaimed(CorrelationKey),

    /// Two distinct transfers derived the same key.
    #[error("Correlation collision on {key}: ({existing_domain}, {existing_nonce}) vs ({domain}, {nonce})")]
    CorrelationCollision {
        /// Colliding key.
        key: CorrelationKey,
        /// Vendor domain already registered under the key.
        existing_domain: VendorDomain,
        /// Nonce already registered under the key.
        existing_nonce: TransferNonce,
        /// Vendor domain being registered.
        domain: VendorDomain,
        /// Nonce being registered.
        nonce: TransferNonce,
    },

    /// Vendor settlement was addressed to another contract.
    #[error("Settlement minted to {actual:?}, expected {expected:?}")]
    UnexpectedMintRecipient {
        /// This adapter.
        expected: Address,
        /// Address in the settlement.
        actual: Address,
    },

    /// Settlement came from another vendor.
    #[error("{actual} settlement presented to {expected} adapter")]
    VendorMismatch {
        /// This adapter's vendor.
        expected: BridgeAdapterType,
        /// Vendor named in the settlement.
        actual: BridgeAdapterType,
    },

    /// Caller is not the owning router.
    #[error("Unauthorized caller {0:?}")]
    Unauthorized(Address),

    /// Ledger failure while moving funds.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl BridgeAdapterError {
    /// Whether a later attempt could succeed without intervention.
    ///
    /// Only `NotSettled` qualifies: the settlement may still be in flight.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotSettled(_))
    }
}

/// Errors raised by an external bridge vendor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendorError {
    /// Vendor refused the call.
    #[error("Vendor rejected transfer: {0}")]
    Rejected(String),

    /// Vendor does not serve this domain.
    #[error("Vendor does not serve domain {0}")]
    UnknownDomain(VendorDomain),

    /// Vendor does not bridge this token on the origin domain.
    #[error("Vendor does not bridge token {0:?}")]
    UnsupportedToken(TokenId),

    /// Caller-assigned nonce was used before.
    #[error("Nonce {nonce} already used on vendor domain {domain}")]
    NonceReused {
        /// Origin vendor domain.
        domain: VendorDomain,
        /// Reused nonce.
        nonce: TransferNonce,
    },

    /// No queued or delivered settlement matches.
    #[error("No settlement for ({domain}, {nonce})")]
    NoSuchSettlement {
        /// Origin vendor domain.
        domain: VendorDomain,
        /// Nonce.
        nonce: TransferNonce,
    },

    /// No adapter is registered for the mint recipient.
    #[error("No settlement receiver at {address:?} on vendor domain {domain}")]
    NoReceiver {
        /// Destination vendor domain.
        domain: VendorDomain,
        /// Mint recipient.
        address: Address,
    },

    /// Ledger failure on either side.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Destination adapter refused the settlement.
    #[error("Settlement receiver failed: {0}")]
    Receiver(BridgeAdapterError),
}
