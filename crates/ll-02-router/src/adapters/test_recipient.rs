//! Recording recipient used by tests and the demo runtime.

use crate::domain::errors::RecipientError;
use crate::ports::outbound::LiquidityLayerRecipient;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{short_hex, Address, Domain, TokenId, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// One call to `handle_with_tokens`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedTransfer {
    /// Origin domain.
    pub origin: Domain,
    /// Original sender on the origin chain.
    pub sender: Address,
    /// Message body.
    pub body: Vec<u8>,
    /// Token received.
    pub token: TokenId,
    /// Amount received.
    pub amount: U256,
}

/// Recipient that records every transfer and can be told to refuse.
#[derive(Default)]
pub struct TestLiquidityLayerMessageRecipient {
    received: Mutex<Vec<ReceivedTransfer>>,
    failing: AtomicBool,
}

impl TestLiquidityLayerMessageRecipient {
    /// Accepting recipient.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every subsequent transfer.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Transfers accepted so far.
    pub fn received(&self) -> Vec<ReceivedTransfer> {
        self.received.lock().clone()
    }

    /// Number of transfers accepted.
    pub fn count(&self) -> usize {
        self.received.lock().len()
    }
}

#[async_trait]
impl LiquidityLayerRecipient for TestLiquidityLayerMessageRecipient {
    async fn handle_with_tokens(
        &self,
        origin: Domain,
        sender: Address,
        body: &[u8],
        token: TokenId,
        amount: U256,
    ) -> Result<(), RecipientError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecipientError::new("recipient refused transfer"));
        }
        info!(
            origin,
            sender = %short_hex(&sender),
            %amount,
            "[ll-02] ReceivedMessage"
        );
        self.received.lock().push(ReceivedTransfer {
            origin,
            sender,
            body: body.to_vec(),
            token,
            amount,
        });
        Ok(())
    }
}
