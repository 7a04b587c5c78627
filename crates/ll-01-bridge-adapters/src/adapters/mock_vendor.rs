//! In-Memory Vendor Bridge
//!
//! Simulates a bridge vendor deployed on several chains. Transfers burn on
//! the origin ledger immediately and queue a settlement; nothing reaches the
//! destination until a test drives the queue with `settle_next`,
//! `settle_all`, `settle_nonce` or `replay_settlement`.
//!
//! Delivering a settlement mints on the destination ledger and then calls the
//! receiver registered for the mint recipient. If the receiver refuses, the
//! mint is burned back so the attempt leaves no trace.

use crate::domain::{
    BridgeAdapterType, TransferNonce, VendorDomain, VendorError, VendorSettlement, VendorTransfer,
};
use crate::ports::{SettlementReceiver, VendorBridge};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Address, InMemoryTokenLedger, TokenId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// The vendor's presence on one chain.
struct ChainEndpoint {
    ledger: Arc<InMemoryTokenLedger>,
    token: TokenId,
}

/// A burned transfer waiting to be settled.
#[derive(Clone, Debug)]
struct QueuedSettlement {
    destination_vendor_domain: VendorDomain,
    settlement: VendorSettlement,
}

#[derive(Default)]
struct NonceBook {
    next: HashMap<VendorDomain, TransferNonce>,
    used: HashSet<(VendorDomain, TransferNonce)>,
}

/// Simulated bridge vendor spanning every attached chain.
pub struct InMemoryVendorBridge {
    vendor: BridgeAdapterType,
    chains: RwLock<HashMap<VendorDomain, ChainEndpoint>>,
    receivers: RwLock<HashMap<(VendorDomain, Address), Weak<dyn SettlementReceiver>>>,
    nonces: Mutex<NonceBook>,
    queue: Mutex<VecDeque<QueuedSettlement>>,
    delivered: Mutex<HashMap<(VendorDomain, TransferNonce), QueuedSettlement>>,
    rejecting: AtomicBool,
}

impl InMemoryVendorBridge {
    /// Create a vendor with no chains attached.
    pub fn new(vendor: BridgeAdapterType) -> Self {
        Self {
            vendor,
            chains: RwLock::new(HashMap::new()),
            receivers: RwLock::new(HashMap::new()),
            nonces: Mutex::new(NonceBook::default()),
            queue: Mutex::new(VecDeque::new()),
            delivered: Mutex::new(HashMap::new()),
            rejecting: AtomicBool::new(false),
        }
    }

    /// Deploy the vendor on `vendor_domain`, bridging `token` on `ledger`.
    pub fn attach_chain(
        &self,
        vendor_domain: VendorDomain,
        ledger: Arc<InMemoryTokenLedger>,
        token: TokenId,
    ) {
        debug!(
            vendor = %self.vendor,
            vendor_domain,
            token = %short_hex(&token),
            "[ll-01] Vendor attached to chain"
        );
        self.chains
            .write()
            .insert(vendor_domain, ChainEndpoint { ledger, token });
    }

    /// Make every subsequent `initiate_transfer` fail.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Settlements waiting for delivery.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Queued settlements in delivery order.
    pub fn pending(&self) -> Vec<VendorSettlement> {
        self.queue
            .lock()
            .iter()
            .map(|q| q.settlement.clone())
            .collect()
    }

    /// Settlements delivered so far.
    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().len()
    }

    /// Deliver the oldest queued settlement.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if nothing is queued. A refused settlement goes to the back
    /// of the queue.
    pub fn settle_next(&self) -> Result<Option<VendorSettlement>, VendorError> {
        let Some(next) = self.queue.lock().pop_front() else {
            return Ok(None);
        };
        self.deliver_queued(next).map(Some)
    }

    /// Deliver everything queued when the call starts.
    pub fn settle_all(&self) -> Vec<Result<VendorSettlement, VendorError>> {
        let batch: Vec<QueuedSettlement> = self.queue.lock().drain(..).collect();
        batch.into_iter().map(|q| self.deliver_queued(q)).collect()
    }

    /// Deliver the queued settlement for `(origin_vendor_domain, nonce)`.
    pub fn settle_nonce(
        &self,
        origin_vendor_domain: VendorDomain,
        nonce: TransferNonce,
    ) -> Result<VendorSettlement, VendorError> {
        let queued = {
            let mut queue = self.queue.lock();
            let position = queue
                .iter()
                .position(|q| {
                    q.settlement.origin_vendor_domain == origin_vendor_domain
                        && q.settlement.nonce == nonce
                })
                .ok_or(VendorError::NoSuchSettlement {
                    domain: origin_vendor_domain,
                    nonce,
                })?;
            queue.remove(position)
        };
        match queued {
            Some(q) => self.deliver_queued(q),
            None => Err(VendorError::NoSuchSettlement {
                domain: origin_vendor_domain,
                nonce,
            }),
        }
    }

    /// Deliver an already delivered settlement a second time.
    ///
    /// Models a duplicate vendor callback; a correct receiver refuses it.
    pub fn replay_settlement(
        &self,
        origin_vendor_domain: VendorDomain,
        nonce: TransferNonce,
    ) -> Result<VendorSettlement, VendorError> {
        let queued = self
            .delivered
            .lock()
            .get(&(origin_vendor_domain, nonce))
            .cloned()
            .ok_or(VendorError::NoSuchSettlement {
                domain: origin_vendor_domain,
                nonce,
            })?;
        warn!(
            vendor = %self.vendor,
            origin_vendor_domain,
            nonce,
            "[ll-01] Replaying settlement"
        );
        self.deliver(&queued)?;
        Ok(queued.settlement)
    }

    fn deliver_queued(&self, queued: QueuedSettlement) -> Result<VendorSettlement, VendorError> {
        match self.deliver(&queued) {
            Ok(()) => {
                let settlement = queued.settlement.clone();
                self.delivered.lock().insert(
                    (settlement.origin_vendor_domain, settlement.nonce),
                    queued,
                );
                Ok(settlement)
            }
            Err(e) => {
                self.queue.lock().push_back(queued);
                Err(e)
            }
        }
    }

    /// Mint on the destination and notify the receiver, burning back on refusal.
    fn deliver(&self, queued: &QueuedSettlement) -> Result<(), VendorError> {
        let settlement = &queued.settlement;
        let destination = queued.destination_vendor_domain;

        let (ledger, token) = {
            let chains = self.chains.read();
            let endpoint = chains
                .get(&destination)
                .ok_or(VendorError::UnknownDomain(destination))?;
            (endpoint.ledger.clone(), endpoint.token)
        };

        let receiver = self
            .receivers
            .read()
            .get(&(destination, settlement.mint_recipient))
            .and_then(Weak::upgrade)
            .ok_or(VendorError::NoReceiver {
                domain: destination,
                address: settlement.mint_recipient,
            })?;

        ledger.mint(token, settlement.mint_recipient, settlement.amount)?;

        if let Err(e) = receiver.settle(settlement.clone()) {
            ledger.burn(token, settlement.mint_recipient, settlement.amount)?;
            debug!(
                vendor = %self.vendor,
                nonce = settlement.nonce,
                error = %e,
                "[ll-01] Settlement refused, mint reverted"
            );
            return Err(VendorError::Receiver(e));
        }

        info!(
            vendor = %self.vendor,
            origin_vendor_domain = settlement.origin_vendor_domain,
            destination_vendor_domain = destination,
            nonce = settlement.nonce,
            amount = %settlement.amount,
            "[ll-01] Settlement delivered"
        );
        Ok(())
    }
}

#[async_trait]
impl VendorBridge for InMemoryVendorBridge {
    fn vendor(&self) -> BridgeAdapterType {
        self.vendor
    }

    async fn initiate_transfer(
        &self,
        transfer: VendorTransfer,
    ) -> Result<TransferNonce, VendorError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(VendorError::Rejected("vendor paused".into()));
        }

        let origin = {
            let chains = self.chains.read();
            if !chains.contains_key(&transfer.destination_vendor_domain) {
                return Err(VendorError::UnknownDomain(transfer.destination_vendor_domain));
            }
            let endpoint = chains
                .get(&transfer.origin_vendor_domain)
                .ok_or(VendorError::UnknownDomain(transfer.origin_vendor_domain))?;
            if endpoint.token != transfer.token {
                return Err(VendorError::UnsupportedToken(transfer.token));
            }
            endpoint.ledger.clone()
        };

        let nonce = {
            let mut book = self.nonces.lock();
            let nonce = match transfer.nonce {
                Some(n) => {
                    if book.used.contains(&(transfer.origin_vendor_domain, n)) {
                        return Err(VendorError::NonceReused {
                            domain: transfer.origin_vendor_domain,
                            nonce: n,
                        });
                    }
                    n
                }
                None => {
                    let counter = book.next.entry(transfer.origin_vendor_domain).or_default();
                    let n = *counter;
                    *counter += 1;
                    n
                }
            };
            origin.burn(transfer.token, transfer.burn_from, transfer.amount)?;
            book.used.insert((transfer.origin_vendor_domain, nonce));
            nonce
        };

        self.queue.lock().push_back(QueuedSettlement {
            destination_vendor_domain: transfer.destination_vendor_domain,
            settlement: VendorSettlement {
                vendor: self.vendor,
                origin_vendor_domain: transfer.origin_vendor_domain,
                nonce,
                mint_recipient: transfer.mint_recipient,
                amount: transfer.amount,
            },
        });

        debug!(
            vendor = %self.vendor,
            origin_vendor_domain = transfer.origin_vendor_domain,
            nonce,
            amount = %transfer.amount,
            "[ll-01] Transfer burned and queued"
        );
        Ok(nonce)
    }

    fn register_receiver(
        &self,
        vendor_domain: VendorDomain,
        address: Address,
        receiver: Weak<dyn SettlementReceiver>,
    ) {
        self.receivers
            .write()
            .insert((vendor_domain, address), receiver);
    }
}
