//! Settlement core shared by every vendor adapter.
//!
//! Owns the adapter's escrow accounting, its correlation index and its
//! settlement ledger. Vendor-specific wrappers only decide how transfer
//! nonces are assigned.

use crate::algorithms::{derive_correlation_key, CorrelationIndex, SettlementLedger};
use crate::domain::{
    invariant_free_balance, BridgeAdapterError, BridgeAdapterType, CorrelationKey, SendRequest,
    SentTransfer, SettlementRecord, SettlementState, TransferNonce, VendorDomain,
    VendorSettlement, VendorTransfer,
};
use crate::ports::VendorBridge;
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Address, Domain, InMemoryTokenLedger, TokenId, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where an adapter lives and who owns it.
#[derive(Clone)]
pub struct AdapterParams {
    /// Adapter contract address.
    pub address: Address,
    /// Domain of the chain the adapter is deployed on.
    pub local_domain: Domain,
    /// Owning router; the only caller allowed to claim.
    pub router: Address,
    /// Token ledger of the local chain.
    pub ledger: Arc<InMemoryTokenLedger>,
}

/// State and behaviour common to all adapters.
pub struct AdapterCore {
    adapter_type: BridgeAdapterType,
    address: Address,
    local_domain: Domain,
    local_vendor_domain: VendorDomain,
    router: Address,
    token: TokenId,
    ledger: Arc<InMemoryTokenLedger>,
    domain_mapping: HashMap<Domain, VendorDomain>,
    remote_adapters: RwLock<HashMap<Domain, Address>>,
    vendor: Arc<dyn VendorBridge>,
    index: Mutex<CorrelationIndex>,
    settlements: Mutex<SettlementLedger>,
}

impl AdapterCore {
    /// Build a core for `adapter_type`.
    ///
    /// # Errors
    ///
    /// `UnsupportedDomain` if the local chain is missing from `mapping`.
    pub fn new(
        adapter_type: BridgeAdapterType,
        params: AdapterParams,
        token: TokenId,
        mapping: Vec<(Domain, VendorDomain)>,
        vendor: Arc<dyn VendorBridge>,
    ) -> Result<Self, BridgeAdapterError> {
        let domain_mapping: HashMap<Domain, VendorDomain> = mapping.into_iter().collect();
        let local_vendor_domain = domain_mapping.get(&params.local_domain).copied().ok_or(
            BridgeAdapterError::UnsupportedDomain {
                adapter: adapter_type,
                domain: params.local_domain,
            },
        )?;

        Ok(Self {
            adapter_type,
            address: params.address,
            local_domain: params.local_domain,
            local_vendor_domain,
            router: params.router,
            token,
            ledger: params.ledger,
            domain_mapping,
            remote_adapters: RwLock::new(HashMap::new()),
            vendor,
            index: Mutex::new(CorrelationIndex::new(adapter_type)),
            settlements: Mutex::new(SettlementLedger::new()),
        })
    }

    /// Vendor this core serves.
    pub fn adapter_type(&self) -> BridgeAdapterType {
        self.adapter_type
    }

    /// Adapter contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Bridged token.
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// Owning router.
    pub fn router(&self) -> Address {
        self.router
    }

    /// Domain of the local chain.
    pub fn local_domain(&self) -> Domain {
        self.local_domain
    }

    /// Vendor's number for the local chain.
    pub fn local_vendor_domain(&self) -> VendorDomain {
        self.local_vendor_domain
    }

    /// Vendor domain mapped to `domain`.
    pub fn vendor_domain_for(&self, domain: Domain) -> Option<VendorDomain> {
        self.domain_mapping.get(&domain).copied()
    }

    /// Messaging domain mapped to `vendor_domain`.
    pub fn domain_for_vendor(&self, vendor_domain: VendorDomain) -> Option<Domain> {
        self.domain_mapping
            .iter()
            .find(|(_, v)| **v == vendor_domain)
            .map(|(d, _)| *d)
    }

    /// Enroll the counterpart adapter on `domain`.
    pub fn enroll_remote_adapter(&self, domain: Domain, address: Address) {
        debug!(
            adapter = %self.adapter_type,
            domain,
            remote = %short_hex(&address),
            "[ll-01] Remote adapter enrolled"
        );
        self.remote_adapters.write().insert(domain, address);
    }

    /// Counterpart adapter on `domain`.
    pub fn remote_adapter(&self, domain: Domain) -> Option<Address> {
        self.remote_adapters.read().get(&domain).copied()
    }

    /// Check token, destination mapping and counterpart enrollment.
    pub fn preflight(&self, destination: Domain, token: TokenId) -> Result<(), BridgeAdapterError> {
        self.destination_for(destination, token).map(|_| ())
    }

    fn destination_for(
        &self,
        destination: Domain,
        token: TokenId,
    ) -> Result<(VendorDomain, Address), BridgeAdapterError> {
        if token != self.token {
            return Err(BridgeAdapterError::UnsupportedToken {
                adapter: self.adapter_type,
                token,
            });
        }
        let vendor_domain =
            self.vendor_domain_for(destination)
                .ok_or(BridgeAdapterError::UnsupportedDomain {
                    adapter: self.adapter_type,
                    domain: destination,
                })?;
        let remote = self
            .remote_adapter(destination)
            .ok_or(BridgeAdapterError::NoRemoteAdapter {
                adapter: self.adapter_type,
                domain: destination,
            })?;
        Ok((vendor_domain, remote))
    }

    /// Funds held by the adapter that do not back a pending settlement.
    pub fn free_balance(&self) -> U256 {
        let reserved = self.settlements.lock().reserved();
        self.ledger
            .balance_of(self.token, self.address)
            .saturating_sub(reserved)
    }

    /// Bridge `request.amount` of escrowed funds.
    ///
    /// `nonce` is `Some` when the adapter assigns transfer nonces itself.
    pub async fn send(
        &self,
        request: SendRequest,
        nonce: Option<TransferNonce>,
    ) -> Result<SentTransfer, BridgeAdapterError> {
        let (destination_vendor_domain, remote) =
            self.destination_for(request.destination, request.token)?;

        {
            let settlements = self.settlements.lock();
            let balance = self.ledger.balance_of(self.token, self.address);
            invariant_free_balance(balance, settlements.reserved(), request.amount)?;
        }

        let transfer = VendorTransfer {
            origin_vendor_domain: self.local_vendor_domain,
            destination_vendor_domain,
            token: request.token,
            amount: request.amount,
            burn_from: self.address,
            mint_recipient: remote,
            nonce,
        };

        let nonce = match self.vendor.initiate_transfer(transfer).await {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    adapter = %self.adapter_type,
                    destination = request.destination,
                    error = %e,
                    "[ll-01] Vendor rejected transfer, refunding sender"
                );
                if let Err(refund) = self.ledger.transfer(
                    request.token,
                    self.address,
                    request.sender,
                    request.amount,
                ) {
                    error!(
                        adapter = %self.adapter_type,
                        sender = %short_hex(&request.sender),
                        error = %refund,
                        "[ll-01] Refund failed"
                    );
                }
                return Err(BridgeAdapterError::TransferInitiationFailed(e.to_string()));
            }
        };

        let correlation_key =
            derive_correlation_key(self.adapter_type, self.local_vendor_domain, nonce);

        info!(
            adapter = %self.adapter_type,
            key = %correlation_key,
            destination = request.destination,
            nonce,
            amount = %request.amount,
            "[ll-01] Transfer initiated"
        );

        Ok(SentTransfer {
            correlation_key,
            origin_vendor_domain: self.local_vendor_domain,
            nonce,
        })
    }

    /// Record a settlement for a key observed through the vendor path.
    pub fn receive(&self, key: CorrelationKey, amount: U256) -> Result<(), BridgeAdapterError> {
        if !self.index.lock().contains(&key) {
            return Err(BridgeAdapterError::UnknownCorrelationKey(key));
        }

        self.settlements.lock().settle(key, amount)?;

        info!(
            adapter = %self.adapter_type,
            key = %key,
            %amount,
            "[ll-01] Settlement received"
        );
        Ok(())
    }

    /// Release the settled amount for `key` to the router.
    pub fn claim(&self, caller: Address, key: CorrelationKey) -> Result<U256, BridgeAdapterError> {
        if caller != self.router {
            return Err(BridgeAdapterError::Unauthorized(caller));
        }

        let mut settlements = self.settlements.lock();
        let amount = settlements.claimable(&key)?;
        self.ledger
            .transfer(self.token, self.address, self.router, amount)?;
        settlements.mark_claimed(&key)?;

        debug!(
            adapter = %self.adapter_type,
            key = %key,
            %amount,
            "[ll-01] Settlement claimed"
        );
        Ok(amount)
    }

    /// Vendor-facing settlement entry point.
    pub fn settle(&self, settlement: VendorSettlement) -> Result<(), BridgeAdapterError> {
        if settlement.vendor != self.adapter_type {
            return Err(BridgeAdapterError::VendorMismatch {
                expected: self.adapter_type,
                actual: settlement.vendor,
            });
        }
        if settlement.mint_recipient != self.address {
            return Err(BridgeAdapterError::UnexpectedMintRecipient {
                expected: self.address,
                actual: settlement.mint_recipient,
            });
        }
        if self
            .domain_for_vendor(settlement.origin_vendor_domain)
            .is_none()
        {
            return Err(BridgeAdapterError::UnsupportedVendorDomain {
                adapter: self.adapter_type,
                vendor_domain: settlement.origin_vendor_domain,
            });
        }

        let key = self
            .index
            .lock()
            .register(settlement.origin_vendor_domain, settlement.nonce)?;
        self.receive(key, settlement.amount)
    }

    /// Settlement state of `key`.
    pub fn settlement_state(&self, key: &CorrelationKey) -> SettlementState {
        self.settlements.lock().state(key)
    }

    /// Settled but unclaimed records.
    pub fn pending_settlements(&self) -> Vec<SettlementRecord> {
        self.settlements.lock().pending()
    }

    /// Number of keys observed through the settlement path.
    pub fn observed_keys(&self) -> usize {
        self.index.lock().len()
    }
}
