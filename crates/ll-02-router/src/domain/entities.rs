//! Domain entities for the liquidity layer router.

use ll_01_bridge_adapters::{BridgeAdapterType, CorrelationKey};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Domain, TokenId, U256};

/// A request to move `amount` of `token` plus `body` to `recipient` on
/// `destination`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Destination domain.
    pub destination: Domain,
    /// Recipient on the destination chain.
    pub recipient: Address,
    /// Opaque payload handed to the recipient.
    pub body: Vec<u8>,
    /// Token on the origin chain.
    pub token: TokenId,
    /// Amount to move.
    pub amount: U256,
    /// Bridge to move it over.
    pub adapter_type: BridgeAdapterType,
}

/// Funds claimed from an adapter whose recipient could not take them.
///
/// Held by the destination router until the owner releases them, unless
/// `released` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndeliveredTransfer {
    /// Key the funds were claimed under.
    pub correlation_key: CorrelationKey,
    /// Origin domain.
    pub origin: Domain,
    /// Account that dispatched the transfer on the origin chain.
    pub original_sender: Address,
    /// Intended recipient.
    pub recipient: Address,
    /// Token held in escrow.
    pub token: TokenId,
    /// Amount held in escrow.
    pub amount: U256,
    /// Why delivery failed.
    pub reason: String,
    /// The failing hook kept the funds, so the router holds nothing.
    #[serde(default)]
    pub released: bool,
}

/// A transfer completed by the destination router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveredTransfer {
    /// Key the funds were claimed under.
    pub correlation_key: CorrelationKey,
    /// Recipient credited.
    pub recipient: Address,
    /// Token credited.
    pub token: TokenId,
    /// Amount credited, as settled by the vendor.
    pub amount: U256,
    /// Amount the origin router sent.
    pub sent_amount: U256,
}

impl DeliveredTransfer {
    /// Whether the vendor settled exactly what was sent.
    pub fn is_conserved(&self) -> bool {
        self.amount == self.sent_amount
    }
}
