//! Outbound port: the recipient hook on the destination chain.

use crate::domain::errors::RecipientError;
use async_trait::async_trait;
use shared_types::{Address, Domain, TokenId, U256};

/// Application receiving tokens with a message.
#[async_trait]
pub trait LiquidityLayerRecipient: Send + Sync {
    /// Called once per transfer, after `amount` of `token` has been credited
    /// to the recipient.
    ///
    /// An error takes the funds back into router escrow.
    async fn handle_with_tokens(
        &self,
        origin: Domain,
        sender: Address,
        body: &[u8],
        token: TokenId,
        amount: U256,
    ) -> Result<(), RecipientError>;
}
