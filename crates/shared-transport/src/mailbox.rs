//! # Mailbox
//!
//! The per-chain endpoint of the message transport.
//!
//! A mailbox accepts outbound messages (`dispatch`) into its outbox and
//! processes inbound messages (`process`) by handing the body to the
//! registered recipient. Proof verification is not modelled; the relayer is
//! trusted to present only messages that were actually dispatched.

use crate::delivery_cache::{DeliveryCache, DeliveryCacheError};
use crate::events::{EventFilter, TransportEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Address, Domain, InterchainMessage, MessageId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

// =============================================================================
// ERRORS
// =============================================================================

/// Outcome a recipient reports for a failed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Present the message again later.
    #[error("Delivery deferred: {0}")]
    Retryable(String),

    /// Never deliver this message automatically.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl DeliveryError {
    /// Whether the relayer should present the message again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Message was presented to the wrong mailbox.
    #[error("Message for domain {expected} presented to mailbox {actual}")]
    WrongDestination {
        /// Destination written in the message.
        expected: Domain,
        /// Domain of the mailbox it was presented to.
        actual: Domain,
    },

    /// No mailbox exists for the destination domain.
    #[error("No mailbox for domain {0}")]
    UnknownDomain(Domain),

    /// No recipient is registered at the destination address.
    #[error("No recipient registered at {0:?}")]
    UnknownRecipient(Address),

    /// Exactly-once bookkeeping refused the attempt.
    #[error(transparent)]
    Duplicate(#[from] DeliveryCacheError),

    /// The recipient failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl TransportError {
    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Delivery(e) => e.is_retryable(),
            Self::Duplicate(DeliveryCacheError::InFlight { .. }) => true,
            _ => false,
        }
    }
}

// =============================================================================
// PORTS
// =============================================================================

/// Dispatch side of the transport, as seen by applications.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Domain of the chain this endpoint lives on.
    fn local_domain(&self) -> Domain;

    /// Enqueue `body` for `recipient` on `destination`, sent by `sender`.
    ///
    /// # Returns
    ///
    /// The id of the dispatched message.
    async fn dispatch(
        &self,
        sender: Address,
        destination: Domain,
        recipient: Address,
        body: Vec<u8>,
    ) -> Result<MessageId, TransportError>;
}

/// Delivery side of the transport, implemented by applications.
#[async_trait]
pub trait MessageRecipient: Send + Sync {
    /// Handle a delivered message.
    ///
    /// Invoked at most once successfully per message. A `Retryable` error
    /// asks the transport to present the message again.
    async fn handle(&self, origin: Domain, sender: Address, body: &[u8])
        -> Result<(), DeliveryError>;

    /// Whether a parked message could now be handled.
    ///
    /// Must not change state. The default never wakes a parked message, so
    /// it waits for an operator to unpark it.
    fn is_ready(&self, _origin: Domain, _sender: Address, _body: &[u8]) -> bool {
        false
    }
}

// =============================================================================
// IN-MEMORY MAILBOX
// =============================================================================

/// In-memory mailbox for one chain.
pub struct InMemoryMailbox {
    domain: Domain,
    nonce: AtomicU32,
    outbox: Mutex<VecDeque<InterchainMessage>>,
    recipients: RwLock<HashMap<Address, Arc<dyn MessageRecipient>>>,
    deliveries: Mutex<DeliveryCache>,
    events: broadcast::Sender<TransportEvent>,
}

impl InMemoryMailbox {
    /// Create a mailbox with its own event channel.
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self::with_events(domain, events)
    }

    /// Create a mailbox publishing onto a shared event channel.
    #[must_use]
    pub fn with_events(domain: Domain, events: broadcast::Sender<TransportEvent>) -> Self {
        Self {
            domain,
            nonce: AtomicU32::new(0),
            outbox: Mutex::new(VecDeque::new()),
            recipients: RwLock::new(HashMap::new()),
            deliveries: Mutex::new(DeliveryCache::new()),
            events,
        }
    }

    /// Domain of this mailbox.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Number of messages dispatched so far.
    pub fn count(&self) -> u32 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Register `recipient` to receive messages addressed to `address`.
    pub fn register_recipient(&self, address: Address, recipient: Arc<dyn MessageRecipient>) {
        debug!(
            domain = self.domain,
            recipient = %short_hex(&address),
            "[transport] Recipient registered"
        );
        self.recipients.write().insert(address, recipient);
    }

    /// Whether message `id` was delivered on this mailbox.
    pub fn delivered(&self, id: &MessageId) -> bool {
        self.deliveries.lock().is_delivered(id)
    }

    /// Number of messages delivered on this mailbox.
    pub fn delivered_count(&self) -> usize {
        self.deliveries.lock().delivered_count()
    }

    /// Number of dispatched messages not yet picked up by a relayer.
    pub fn outbox_len(&self) -> usize {
        self.outbox.lock().len()
    }

    /// Remove and return every message waiting in the outbox.
    pub fn take_outbound(&self) -> Vec<InterchainMessage> {
        self.outbox.lock().drain(..).collect()
    }

    /// Subscribe to this mailbox's event channel.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.events.subscribe(), filter)
    }

    /// Whether the recipient of `message` reports it could now be handled.
    pub fn is_ready(&self, message: &InterchainMessage) -> bool {
        if message.destination != self.domain || self.delivered(&message.id()) {
            return false;
        }
        let recipient = self.recipients.read().get(&message.recipient).cloned();
        recipient.is_some_and(|r| r.is_ready(message.origin, message.sender, &message.body))
    }

    /// Deliver `message` to its recipient.
    ///
    /// # Errors
    ///
    /// - `WrongDestination` if the message is not for this domain
    /// - `Duplicate` if it was delivered already or is being delivered
    /// - `UnknownRecipient` if nothing is registered at the recipient address
    /// - `Delivery` if the recipient failed; the message stays undelivered
    pub async fn process(&self, message: &InterchainMessage) -> Result<(), TransportError> {
        if message.destination != self.domain {
            return Err(TransportError::WrongDestination {
                expected: message.destination,
                actual: self.domain,
            });
        }

        let id = message.id();
        let recipient = self
            .recipients
            .read()
            .get(&message.recipient)
            .cloned()
            .ok_or(TransportError::UnknownRecipient(message.recipient))?;

        self.deliveries.lock().begin(id)?;

        match recipient
            .handle(message.origin, message.sender, &message.body)
            .await
        {
            Ok(()) => {
                self.deliveries.lock().complete(id);
                info!(
                    id = %short_hex(&id),
                    origin = message.origin,
                    destination = self.domain,
                    "[transport] Message processed"
                );
                let _ = self.events.send(TransportEvent::Processed {
                    id,
                    origin: message.origin,
                    destination: self.domain,
                });
                Ok(())
            }
            Err(e) => {
                self.deliveries.lock().abort(id);
                warn!(
                    id = %short_hex(&id),
                    error = %e,
                    "[transport] Recipient failed"
                );
                Err(TransportError::Delivery(e))
            }
        }
    }
}

#[async_trait]
impl MessageTransport for InMemoryMailbox {
    fn local_domain(&self) -> Domain {
        self.domain
    }

    async fn dispatch(
        &self,
        sender: Address,
        destination: Domain,
        recipient: Address,
        body: Vec<u8>,
    ) -> Result<MessageId, TransportError> {
        let message = InterchainMessage {
            version: InterchainMessage::CURRENT_VERSION,
            nonce: self.nonce.fetch_add(1, Ordering::SeqCst),
            origin: self.domain,
            sender,
            destination,
            recipient,
            body,
        };
        let id = message.id();

        self.outbox.lock().push_back(message);

        debug!(
            id = %short_hex(&id),
            origin = self.domain,
            destination,
            "[transport] Message dispatched"
        );
        let _ = self.events.send(TransportEvent::Dispatched {
            id,
            origin: self.domain,
            destination,
        });

        Ok(id)
    }
}
