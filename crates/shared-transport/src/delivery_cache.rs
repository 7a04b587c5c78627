//! # Delivery Cache
//!
//! Exactly-once bookkeeping for inbound messages on one mailbox.
//!
//! ## Design
//!
//! - A message id is claimed (`begin`) before its recipient runs and released
//!   (`abort`) or sealed (`complete`) afterwards.
//! - A sealed id can never be claimed again, which turns a replayed or
//!   duplicated delivery into an error instead of a second `handle` call.
//! - An in-flight id cannot be claimed either, so two relayers racing on the
//!   same message cannot both reach the recipient.

use shared_types::MessageId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from delivery cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryCacheError {
    /// The message was already delivered.
    #[error("Message {id:?} already delivered")]
    AlreadyDelivered {
        /// Message id.
        id: MessageId,
    },

    /// Another delivery attempt for the message is running.
    #[error("Message {id:?} is being delivered")]
    InFlight {
        /// Message id.
        id: MessageId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeliveryState {
    InFlight,
    Delivered,
}

/// Per-mailbox record of in-flight and delivered messages.
#[derive(Debug, Default)]
pub struct DeliveryCache {
    entries: HashMap<MessageId, DeliveryState>,
}

impl DeliveryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for a delivery attempt.
    ///
    /// # Errors
    ///
    /// - `AlreadyDelivered` if the message was sealed earlier
    /// - `InFlight` if another attempt holds the claim
    pub fn begin(&mut self, id: MessageId) -> Result<(), DeliveryCacheError> {
        match self.entries.get(&id) {
            Some(DeliveryState::Delivered) => Err(DeliveryCacheError::AlreadyDelivered { id }),
            Some(DeliveryState::InFlight) => Err(DeliveryCacheError::InFlight { id }),
            None => {
                self.entries.insert(id, DeliveryState::InFlight);
                Ok(())
            }
        }
    }

    /// Seal `id` as delivered.
    pub fn complete(&mut self, id: MessageId) {
        self.entries.insert(id, DeliveryState::Delivered);
    }

    /// Release the claim on `id` after a failed attempt.
    ///
    /// Sealed ids are left untouched.
    pub fn abort(&mut self, id: MessageId) {
        if self.entries.get(&id) == Some(&DeliveryState::InFlight) {
            self.entries.remove(&id);
        }
    }

    /// Whether `id` was delivered.
    #[must_use]
    pub fn is_delivered(&self, id: &MessageId) -> bool {
        self.entries.get(id) == Some(&DeliveryState::Delivered)
    }

    /// Number of delivered messages.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| **s == DeliveryState::Delivered)
            .count()
    }
}
