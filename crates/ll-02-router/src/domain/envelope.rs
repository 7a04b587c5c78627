//! # Liquidity Layer Envelope
//!
//! The interchain message body carried alongside a token transfer.
//!
//! ```text
//! ┌─────────┬─────────────────────────────────────────────────────────────┐
//! │ version │ bincode(original_sender, recipient, adapter_type, key,     │
//! │  (u8)   │         origin_vendor_domain, nonce, token, amount, body)  │
//! └─────────┴─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The version is the first encoded field, so an unknown version is detected
//! before the rest is parsed.

use super::errors::RouterError;
use ll_01_bridge_adapters::{
    derive_correlation_key, BridgeAdapterType, CorrelationKey, SentTransfer, TransferNonce,
    VendorDomain,
};
use serde::{Deserialize, Serialize};
use shared_types::{Address, TokenId, U256};

/// Current envelope version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Body of every liquidity layer message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLayerMessage {
    /// Envelope version.
    pub version: u8,
    /// Account that dispatched the transfer.
    pub original_sender: Address,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Bridge the funds travel over.
    pub adapter_type: BridgeAdapterType,
    /// Key the destination adapter settles under.
    pub correlation_key: CorrelationKey,
    /// Vendor domain of the origin chain.
    pub origin_vendor_domain: VendorDomain,
    /// Vendor transfer nonce.
    pub transfer_nonce: TransferNonce,
    /// Token on the origin chain.
    pub token: TokenId,
    /// Amount sent.
    pub amount: U256,
    /// Application payload.
    pub body: Vec<u8>,
}

impl LiquidityLayerMessage {
    /// Build the envelope for a transfer the adapter just sent.
    pub fn new(
        original_sender: Address,
        recipient: Address,
        adapter_type: BridgeAdapterType,
        sent: &SentTransfer,
        token: TokenId,
        amount: U256,
        body: Vec<u8>,
    ) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            original_sender,
            recipient,
            adapter_type,
            correlation_key: sent.correlation_key,
            origin_vendor_domain: sent.origin_vendor_domain,
            transfer_nonce: sent.nonce,
            token,
            amount,
            body,
        }
    }

    /// Encode for dispatch.
    pub fn encode(&self) -> Result<Vec<u8>, RouterError> {
        bincode::serialize(self).map_err(|e| RouterError::Encoding(e.to_string()))
    }

    /// Decode a received body.
    ///
    /// # Errors
    ///
    /// - `UnsupportedEnvelopeVersion` if the leading byte is not [`ENVELOPE_VERSION`]
    /// - `MalformedEnvelope` if the rest does not parse
    pub fn decode(bytes: &[u8]) -> Result<Self, RouterError> {
        let version = *bytes
            .first()
            .ok_or_else(|| RouterError::MalformedEnvelope("empty body".into()))?;
        if version != ENVELOPE_VERSION {
            return Err(RouterError::UnsupportedEnvelopeVersion(version));
        }
        bincode::deserialize(bytes).map_err(|e| RouterError::MalformedEnvelope(e.to_string()))
    }

    /// Key derived from the envelope's own vendor fields.
    pub fn derived_key(&self) -> CorrelationKey {
        derive_correlation_key(
            self.adapter_type,
            self.origin_vendor_domain,
            self.transfer_nonce,
        )
    }
}
