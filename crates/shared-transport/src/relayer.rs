//! # Mailbox Network and Relayer
//!
//! Connects the mailboxes of every chain and moves messages between them.
//!
//! ## Delivery Policy
//!
//! ```text
//!  outbox ──take──▶ pending ──process──▶ Ok ──────────────▶ delivered
//!                    ▲  ▲         │
//!                    │  └─────────┼── Retryable (attempts < max)
//!                    │            ├── Retryable (budget spent) ──▶ parked
//!                    └── ready ───┼────────────────────────────────┘
//!                                 └── Rejected ──▶ dead letters
//! ```
//!
//! Each call to [`MailboxNetwork::process_messages`] is one relay pass: every
//! pending message is presented at most once. Retryable failures are kept for
//! the next pass, so the caller decides when redelivery happens and nothing
//! busy-polls. A retryable message that spends its budget is parked, never
//! dead-lettered: it returns to pending with a fresh budget once its
//! recipient reports it ready, or when an operator unparks it.

use crate::events::{EventFilter, TransportEvent};
use crate::mailbox::{InMemoryMailbox, TransportError};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use shared_types::{short_hex, Domain, InterchainMessage, MessageId};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Relayer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Attempts before a retryable message is parked.
    pub max_attempts: u32,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self { max_attempts: 64 }
    }
}

/// A message waiting for (re)delivery.
#[derive(Debug, Clone)]
pub struct PendingMessage {
    /// The message.
    pub message: InterchainMessage,
    /// Delivery attempts so far.
    pub attempts: u32,
    /// Reason given by the last failed attempt.
    pub last_error: Option<String>,
}

/// A message the relayer gave up on.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    /// Entry id.
    pub id: Uuid,
    /// The message.
    pub message: InterchainMessage,
    /// Delivery attempts made.
    pub attempts: u32,
    /// Final error.
    pub reason: String,
}

/// Outcome of one relay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Messages delivered in this pass.
    pub delivered: Vec<MessageId>,
    /// Messages kept for a later pass.
    pub deferred: Vec<MessageId>,
    /// Messages parked in this pass.
    pub parked: Vec<MessageId>,
    /// Messages moved to the dead-letter queue in this pass.
    pub dead_lettered: Vec<MessageId>,
}

impl ProcessReport {
    /// Whether the pass left nothing to do.
    pub fn is_idle(&self) -> bool {
        self.delivered.is_empty()
            && self.deferred.is_empty()
            && self.parked.is_empty()
            && self.dead_lettered.is_empty()
    }
}

/// Every chain's mailbox plus the relayer that connects them.
pub struct MailboxNetwork {
    config: RelayerConfig,
    mailboxes: RwLock<BTreeMap<Domain, Arc<InMemoryMailbox>>>,
    pending: Mutex<VecDeque<PendingMessage>>,
    parked: Mutex<Vec<PendingMessage>>,
    dead_letters: Mutex<Vec<DeadLetter>>,
    events: broadcast::Sender<TransportEvent>,
}

impl MailboxNetwork {
    /// Create an empty network with default relayer settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RelayerConfig::default())
    }

    /// Create an empty network with `config`.
    #[must_use]
    pub fn with_config(config: RelayerConfig) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            config,
            mailboxes: RwLock::new(BTreeMap::new()),
            pending: Mutex::new(VecDeque::new()),
            parked: Mutex::new(Vec::new()),
            dead_letters: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Create (or return the existing) mailbox for `domain`.
    pub fn add_domain(&self, domain: Domain) -> Arc<InMemoryMailbox> {
        self.mailboxes
            .write()
            .entry(domain)
            .or_insert_with(|| Arc::new(InMemoryMailbox::with_events(domain, self.events.clone())))
            .clone()
    }

    /// Mailbox for `domain`.
    pub fn mailbox(&self, domain: Domain) -> Option<Arc<InMemoryMailbox>> {
        self.mailboxes.read().get(&domain).cloned()
    }

    /// Every domain with a mailbox.
    pub fn domains(&self) -> Vec<Domain> {
        self.mailboxes.read().keys().copied().collect()
    }

    /// Subscribe to events from every mailbox and the relayer.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.events.subscribe(), filter)
    }

    /// Messages waiting for the next pass, including ones not yet collected.
    pub fn pending_count(&self) -> usize {
        let collected = self.pending.lock().len();
        let uncollected: usize = self
            .mailboxes
            .read()
            .values()
            .map(|m| m.outbox_len())
            .sum();
        collected + uncollected
    }

    /// Snapshot of the parked messages.
    pub fn parked(&self) -> Vec<PendingMessage> {
        self.parked.lock().clone()
    }

    /// Number of parked messages.
    pub fn parked_count(&self) -> usize {
        self.parked.lock().len()
    }

    /// Snapshot of the dead-letter queue.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.lock().clone()
    }

    /// Run one relay pass over every pending message.
    pub async fn process_messages(&self) -> ProcessReport {
        self.collect_outbound();
        self.wake_parked();

        let batch: Vec<PendingMessage> = self.pending.lock().drain(..).collect();
        let mut report = ProcessReport::default();

        for mut entry in batch {
            let id = entry.message.id();
            entry.attempts += 1;

            let result = match self.mailbox(entry.message.destination) {
                Some(mailbox) => mailbox.process(&entry.message).await,
                None => Err(TransportError::UnknownDomain(entry.message.destination)),
            };

            match result {
                Ok(()) => report.delivered.push(id),
                Err(e) if e.is_retryable() && entry.attempts < self.config.max_attempts => {
                    debug!(
                        id = %short_hex(&id),
                        attempts = entry.attempts,
                        error = %e,
                        "[transport] Delivery deferred"
                    );
                    let _ = self.events.send(TransportEvent::DeliveryDeferred {
                        id,
                        attempts: entry.attempts,
                        reason: e.to_string(),
                    });
                    entry.last_error = Some(e.to_string());
                    report.deferred.push(id);
                    self.pending.lock().push_back(entry);
                }
                Err(e) if e.is_retryable() => {
                    info!(
                        id = %short_hex(&id),
                        attempts = entry.attempts,
                        error = %e,
                        "[transport] Retry budget spent, message parked"
                    );
                    let _ = self.events.send(TransportEvent::DeliveryParked {
                        id,
                        attempts: entry.attempts,
                    });
                    entry.last_error = Some(e.to_string());
                    report.parked.push(id);
                    self.parked.lock().push(entry);
                }
                Err(e) => {
                    warn!(
                        id = %short_hex(&id),
                        attempts = entry.attempts,
                        error = %e,
                        "[transport] Message dead-lettered"
                    );
                    let _ = self.events.send(TransportEvent::DeadLettered {
                        id,
                        reason: e.to_string(),
                    });
                    report.dead_lettered.push(id);
                    self.dead_letters.lock().push(DeadLetter {
                        id: Uuid::new_v4(),
                        message: entry.message,
                        attempts: entry.attempts,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !report.is_idle() {
            info!(
                delivered = report.delivered.len(),
                deferred = report.deferred.len(),
                parked = report.parked.len(),
                dead_lettered = report.dead_lettered.len(),
                "[transport] Relay pass complete"
            );
        }
        report
    }

    /// Put a dead-lettered message back into the pending queue.
    ///
    /// This is the out-of-band remediation hook: an operator decides the
    /// underlying problem is fixed and asks for another attempt.
    pub fn requeue_dead_letter(&self, entry_id: Uuid) -> bool {
        let mut dead = self.dead_letters.lock();
        let Some(pos) = dead.iter().position(|d| d.id == entry_id) else {
            return false;
        };
        let entry = dead.remove(pos);
        self.pending.lock().push_back(PendingMessage {
            message: entry.message,
            attempts: 0,
            last_error: Some(entry.reason),
        });
        true
    }

    /// Move every parked message back to pending with a fresh budget.
    ///
    /// # Returns
    ///
    /// The number of messages unparked.
    pub fn unpark_all(&self) -> usize {
        let parked: Vec<PendingMessage> = self.parked.lock().drain(..).collect();
        let count = parked.len();
        self.pending
            .lock()
            .extend(parked.into_iter().map(|entry| PendingMessage {
                attempts: 0,
                ..entry
            }));
        count
    }

    fn wake_parked(&self) {
        let mut parked = self.parked.lock();
        if parked.is_empty() {
            return;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = parked.drain(..).partition(|entry| {
            self.mailbox(entry.message.destination)
                .is_some_and(|m| m.is_ready(&entry.message))
        });
        *parked = waiting;
        drop(parked);

        if ready.is_empty() {
            return;
        }
        debug!(woken = ready.len(), "[transport] Parked messages ready");
        self.pending
            .lock()
            .extend(ready.into_iter().map(|entry| PendingMessage {
                attempts: 0,
                ..entry
            }));
    }

    fn collect_outbound(&self) {
        let outbound: Vec<InterchainMessage> = self
            .mailboxes
            .read()
            .values()
            .flat_map(|m| m.take_outbound())
            .collect();

        let mut pending = self.pending.lock();
        pending.extend(outbound.into_iter().map(|message| PendingMessage {
            message,
            attempts: 0,
            last_error: None,
        }));
    }
}

impl Default for MailboxNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{DeliveryError, MessageRecipient, MessageTransport};
    use async_trait::async_trait;
    use shared_types::{Address, H256};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fails with a retryable error until `ready` is set.
    struct GatedRecipient {
        ready: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageRecipient for GatedRecipient {
        async fn handle(&self, _: Domain, _: Address, _: &[u8]) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.ready.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DeliveryError::Retryable("not ready".into()))
            }
        }

        fn is_ready(&self, _: Domain, _: Address, _: &[u8]) -> bool {
            self.ready.load(Ordering::SeqCst)
        }
    }

    /// Retryable until `ready` is set, but never reports readiness.
    struct SilentRecipient {
        ready: AtomicBool,
    }

    #[async_trait]
    impl MessageRecipient for SilentRecipient {
        async fn handle(&self, _: Domain, _: Address, _: &[u8]) -> Result<(), DeliveryError> {
            if self.ready.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DeliveryError::Retryable("not ready".into()))
            }
        }
    }

    struct RejectingRecipient;

    #[async_trait]
    impl MessageRecipient for RejectingRecipient {
        async fn handle(&self, _: Domain, _: Address, _: &[u8]) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected("nope".into()))
        }
    }

    fn target() -> Address {
        H256::repeat_byte(0xEE)
    }

    #[tokio::test]
    async fn test_deferred_then_delivered() {
        let network = MailboxNetwork::new();
        let origin = network.add_domain(1);
        let destination = network.add_domain(2);
        let gated = Arc::new(GatedRecipient {
            ready: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        });
        destination.register_recipient(target(), gated.clone());

        let id = origin
            .dispatch(H256::zero(), 2, target(), vec![])
            .await
            .unwrap();

        let first = network.process_messages().await;
        assert_eq!(first.deferred, vec![id]);
        assert_eq!(network.pending_count(), 1);

        gated.ready.store(true, Ordering::SeqCst);
        let second = network.process_messages().await;
        assert_eq!(second.delivered, vec![id]);
        assert_eq!(network.pending_count(), 0);
        assert_eq!(gated.calls.load(Ordering::SeqCst), 2);

        assert!(network.process_messages().await.is_idle());
    }

    #[tokio::test]
    async fn test_rejected_goes_to_dead_letters() {
        let network = MailboxNetwork::new();
        let origin = network.add_domain(1);
        network
            .add_domain(2)
            .register_recipient(target(), Arc::new(RejectingRecipient));

        let id = origin
            .dispatch(H256::zero(), 2, target(), vec![])
            .await
            .unwrap();
        let report = network.process_messages().await;

        assert_eq!(report.dead_lettered, vec![id]);
        let dead = network.dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].message.id(), id);
        assert_eq!(dead[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_unknown_domain_dead_lettered() {
        let network = MailboxNetwork::new();
        let origin = network.add_domain(1);
        origin
            .dispatch(H256::zero(), 99, target(), vec![])
            .await
            .unwrap();

        let report = network.process_messages().await;
        assert_eq!(report.dead_lettered.len(), 1);
        assert!(network.dead_letters()[0].reason.contains("99"));
    }

    #[tokio::test]
    async fn test_spent_budget_parks_instead_of_dead_lettering() {
        let network = MailboxNetwork::with_config(RelayerConfig { max_attempts: 2 });
        let origin = network.add_domain(1);
        let gated = Arc::new(GatedRecipient {
            ready: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        });
        network.add_domain(2).register_recipient(target(), gated.clone());
        let id = origin
            .dispatch(H256::zero(), 2, target(), vec![])
            .await
            .unwrap();

        assert_eq!(network.process_messages().await.deferred, vec![id]);
        assert_eq!(network.process_messages().await.parked, vec![id]);
        assert_eq!(network.pending_count(), 0);
        assert_eq!(network.parked_count(), 1);
        assert!(network.dead_letters().is_empty());

        // Parked messages are not presented while the recipient is not ready.
        for _ in 0..5 {
            assert!(network.process_messages().await.is_idle());
        }
        assert_eq!(gated.calls.load(Ordering::SeqCst), 2);

        gated.ready.store(true, Ordering::SeqCst);
        assert_eq!(network.process_messages().await.delivered, vec![id]);
        assert_eq!(network.parked_count(), 0);
        assert_eq!(gated.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unpark_all_for_silent_recipient() {
        let network = MailboxNetwork::with_config(RelayerConfig { max_attempts: 1 });
        let origin = network.add_domain(1);
        let silent = Arc::new(SilentRecipient {
            ready: AtomicBool::new(false),
        });
        network.add_domain(2).register_recipient(target(), silent.clone());
        let id = origin
            .dispatch(H256::zero(), 2, target(), vec![])
            .await
            .unwrap();

        assert_eq!(network.process_messages().await.parked, vec![id]);
        silent.ready.store(true, Ordering::SeqCst);
        // The default readiness check never wakes it.
        assert!(network.process_messages().await.is_idle());

        assert_eq!(network.unpark_all(), 1);
        assert_eq!(network.pending_count(), 1);
        assert_eq!(network.process_messages().await.delivered, vec![id]);
    }

    #[tokio::test]
    async fn test_requeue_dead_letter() {
        let network = MailboxNetwork::new();
        let origin = network.add_domain(1);
        origin
            .dispatch(H256::zero(), 2, target(), vec![])
            .await
            .unwrap();
        // No mailbox for 2 yet.
        network.process_messages().await;
        let entry = network.dead_letters()[0].id;

        let gated = Arc::new(GatedRecipient {
            ready: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        });
        network.add_domain(2).register_recipient(target(), gated);

        assert!(network.requeue_dead_letter(entry));
        assert!(!network.requeue_dead_letter(entry));
        assert_eq!(network.process_messages().await.delivered.len(), 1);
    }
}
