//! Inbound port: what applications can ask of a router.

use crate::domain::entities::{DeliveredTransfer, TransferRequest};
use crate::domain::errors::RouterError;
use async_trait::async_trait;
use shared_types::{Address, Domain, MessageId};

/// Liquidity layer router API.
#[async_trait]
pub trait LiquidityLayerRouterApi: Send + Sync {
    /// Pull `request.amount` from `caller`, bridge it and dispatch the message.
    ///
    /// Custody leaves `caller` as soon as this returns `Ok`; a later message
    /// failure does not return it.
    async fn dispatch_with_tokens(
        &self,
        caller: Address,
        request: TransferRequest,
    ) -> Result<MessageId, RouterError>;

    /// Process a message delivered by the transport.
    async fn handle_message(
        &self,
        origin: Domain,
        sender: Address,
        body: &[u8],
    ) -> Result<DeliveredTransfer, RouterError>;
}
