//! # Outbound Ports
//!
//! Traits for the external bridge vendors.

use crate::domain::{
    BridgeAdapterError, BridgeAdapterType, TransferNonce, VendorDomain, VendorError,
    VendorSettlement, VendorTransfer,
};
use async_trait::async_trait;
use shared_types::Address;
use std::sync::Weak;

/// Bridge vendor - outbound port.
///
/// One instance serves every chain the vendor is deployed on. Settlements
/// are delivered later to the receiver registered for the mint recipient.
#[async_trait]
pub trait VendorBridge: Send + Sync {
    /// Vendor this bridge belongs to.
    fn vendor(&self) -> BridgeAdapterType;

    /// Burn or lock funds and start a transfer.
    ///
    /// # Returns
    ///
    /// The transfer nonce: the one supplied, or one assigned by the vendor.
    async fn initiate_transfer(
        &self,
        transfer: VendorTransfer,
    ) -> Result<TransferNonce, VendorError>;

    /// Register the contract that settles transfers minted to `address`.
    fn register_receiver(
        &self,
        vendor_domain: VendorDomain,
        address: Address,
        receiver: Weak<dyn SettlementReceiver>,
    );
}

/// Settlement callback - implemented by adapters, called by vendors.
pub trait SettlementReceiver: Send + Sync {
    /// Handle a settlement whose funds were already credited to the receiver.
    ///
    /// An error tells the vendor to revert the credit.
    fn settle(&self, settlement: VendorSettlement) -> Result<(), BridgeAdapterError>;
}
