//! Transport delivery handler.
//!
//! ## Security Boundaries
//!
//! - MUST accept messages only from the router enrolled for the origin
//! - MUST re-derive the correlation key instead of trusting the envelope
//! - MUST report `NotSettled` as retryable so the transport re-presents it
//! - MUST report every other failure as rejected
//! - MUST report a parked message ready only once its funds have settled

use crate::application::service::LiquidityLayerRouter;
use crate::ports::inbound::LiquidityLayerRouterApi;
use async_trait::async_trait;
use shared_transport::{DeliveryError, MessageRecipient};
use shared_types::{Address, Domain};

#[async_trait]
impl MessageRecipient for LiquidityLayerRouter {
    async fn handle(
        &self,
        origin: Domain,
        sender: Address,
        body: &[u8],
    ) -> Result<(), DeliveryError> {
        self.handle_message(origin, sender, body)
            .await
            .map(|_| ())
            .map_err(DeliveryError::from)
    }

    fn is_ready(&self, origin: Domain, sender: Address, body: &[u8]) -> bool {
        self.ready_to_deliver(origin, sender, body)
    }
}
