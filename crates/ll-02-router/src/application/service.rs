//! Liquidity Layer Router Service
//!
//! Main service implementing `LiquidityLayerRouterApi`.

use crate::config::RouterConfig;
use crate::domain::entities::{DeliveredTransfer, TransferRequest, UndeliveredTransfer};
use crate::domain::envelope::LiquidityLayerMessage;
use crate::domain::errors::RouterError;
use crate::ports::inbound::LiquidityLayerRouterApi;
use crate::ports::outbound::LiquidityLayerRecipient;
use async_trait::async_trait;
use ll_01_bridge_adapters::{
    BridgeAdapter, BridgeAdapterApi, BridgeAdapterType, CorrelationKey, SendRequest,
    SettlementState,
};
use parking_lot::{Mutex, RwLock};
use shared_transport::MessageTransport;
use shared_types::{short_hex, Address, Domain, InMemoryTokenLedger, MessageId, TokenId, U256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Liquidity Layer Router
///
/// One per chain. Orchestrates both directions:
///
/// **Dispatch**
/// 1. Resolve adapter and remote router
/// 2. Adapter preflight
/// 3. Pull funds from the caller into adapter escrow
/// 4. Bridge the funds
/// 5. Dispatch the envelope
///
/// **Handle**
/// 1. Authenticate the sending router
/// 2. Decode the envelope and re-derive its key
/// 3. Claim settled funds from the adapter
/// 4. Release funds to the recipient, then invoke its hook
pub struct LiquidityLayerRouter {
    config: RouterConfig,
    transport: Arc<dyn MessageTransport>,
    ledger: Arc<InMemoryTokenLedger>,
    adapters: RwLock<BTreeMap<BridgeAdapterType, Arc<BridgeAdapter>>>,
    remote_routers: RwLock<HashMap<Domain, Address>>,
    recipients: RwLock<HashMap<Address, Arc<dyn LiquidityLayerRecipient>>>,
    undelivered: Mutex<HashMap<CorrelationKey, UndeliveredTransfer>>,
}

impl LiquidityLayerRouter {
    /// Create a router with no adapters or remote routers.
    pub fn new(
        config: RouterConfig,
        transport: Arc<dyn MessageTransport>,
        ledger: Arc<InMemoryTokenLedger>,
    ) -> Self {
        Self {
            config,
            transport,
            ledger,
            adapters: RwLock::new(BTreeMap::new()),
            remote_routers: RwLock::new(HashMap::new()),
            recipients: RwLock::new(HashMap::new()),
            undelivered: Mutex::new(HashMap::new()),
        }
    }

    /// Router contract address.
    pub fn address(&self) -> Address {
        self.config.address
    }

    /// Domain of the local chain.
    pub fn local_domain(&self) -> Domain {
        self.config.local_domain
    }

    /// Router owner.
    pub fn owner(&self) -> Address {
        self.config.owner
    }

    /// Router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `adapter` as the one used for its type.
    pub fn set_adapter(&self, adapter: Arc<BridgeAdapter>) {
        let adapter_type = adapter.adapter_type();
        debug!(
            domain = self.config.local_domain,
            adapter = %adapter_type,
            address = %short_hex(&adapter.address()),
            "[ll-02] Adapter registered"
        );
        self.adapters.write().insert(adapter_type, adapter);
    }

    /// Adapter registered for `adapter_type`.
    pub fn adapter(&self, adapter_type: BridgeAdapterType) -> Option<Arc<BridgeAdapter>> {
        self.adapters.read().get(&adapter_type).cloned()
    }

    /// Types with a registered adapter.
    pub fn adapter_types(&self) -> Vec<BridgeAdapterType> {
        self.adapters.read().keys().copied().collect()
    }

    /// Enroll the router on `domain`.
    pub fn enroll_remote_router(&self, domain: Domain, router: Address) {
        debug!(
            domain = self.config.local_domain,
            remote_domain = domain,
            remote = %short_hex(&router),
            "[ll-02] Remote router enrolled"
        );
        self.remote_routers.write().insert(domain, router);
    }

    /// Router enrolled for `domain`.
    pub fn remote_router(&self, domain: Domain) -> Option<Address> {
        self.remote_routers.read().get(&domain).copied()
    }

    /// Register the hook invoked for transfers to `address`.
    pub fn register_recipient(&self, address: Address, hook: Arc<dyn LiquidityLayerRecipient>) {
        self.recipients.write().insert(address, hook);
    }

    /// Transfers whose recipient hook failed, awaiting release.
    pub fn undelivered_transfers(&self) -> Vec<UndeliveredTransfer> {
        self.undelivered.lock().values().cloned().collect()
    }

    /// Release an escrowed transfer to `to`. Owner only.
    ///
    /// An entry whose funds already sit with the recipient is cleared without
    /// moving anything.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is not the owner
    /// - `NoUndeliveredTransfer` if nothing is escrowed under `key`
    pub fn remediate_undelivered(
        &self,
        caller: Address,
        key: CorrelationKey,
        to: Address,
    ) -> Result<UndeliveredTransfer, RouterError> {
        if caller != self.config.owner {
            return Err(RouterError::Unauthorized(caller));
        }

        let mut undelivered = self.undelivered.lock();
        let entry = undelivered
            .get(&key)
            .cloned()
            .ok_or(RouterError::NoUndeliveredTransfer(key))?;
        if !entry.released {
            self.ledger
                .transfer(entry.token, self.config.address, to, entry.amount)?;
        }
        undelivered.remove(&key);

        info!(
            key = %key,
            to = %short_hex(&to),
            amount = %entry.amount,
            released = entry.released,
            "[ll-02] Undelivered transfer released"
        );
        Ok(entry)
    }

    /// Whether `body` from `sender` on `origin` would now pass
    /// authentication and find its funds settled. Does not change state.
    pub fn ready_to_deliver(&self, origin: Domain, sender: Address, body: &[u8]) -> bool {
        if self.remote_router(origin) != Some(sender) {
            return false;
        }
        let Ok(message) = LiquidityLayerMessage::decode(body) else {
            return false;
        };
        let Some(adapter) = self.adapter(message.adapter_type) else {
            return false;
        };
        self.check_origin(&adapter, origin, &message).is_ok()
            && adapter.settlement_state(&message.correlation_key) == SettlementState::Settled
    }

    fn escrow(&self, entry: UndeliveredTransfer) {
        warn!(
            key = %entry.correlation_key,
            recipient = %short_hex(&entry.recipient),
            reason = %entry.reason,
            "[ll-02] Transfer escrowed"
        );
        self.undelivered.lock().insert(entry.correlation_key, entry);
    }

    fn check_origin(
        &self,
        adapter: &BridgeAdapter,
        origin: Domain,
        message: &LiquidityLayerMessage,
    ) -> Result<(), RouterError> {
        let derived = message.derived_key();
        let origin_matches =
            adapter.core().domain_for_vendor(message.origin_vendor_domain) == Some(origin);
        if derived != message.correlation_key || !origin_matches {
            return Err(RouterError::CorrelationMismatch(message.correlation_key));
        }
        Ok(())
    }

    async fn deliver(
        &self,
        origin: Domain,
        message: &LiquidityLayerMessage,
        token: TokenId,
        amount: U256,
    ) -> Result<(), DeliveryFailure> {
        let router = self.config.address;
        let recipient = message.recipient;
        let hook = self.recipients.read().get(&recipient).cloned();
        let Some(hook) = hook else {
            return Err(DeliveryFailure::held("no recipient hook registered"));
        };

        self.ledger
            .transfer(token, router, recipient, amount)
            .map_err(|e| DeliveryFailure::held(e.to_string()))?;

        let Err(e) = hook
            .handle_with_tokens(origin, message.original_sender, &message.body, token, amount)
            .await
        else {
            return Ok(());
        };

        // Take the funds back; the hook may already have moved them.
        match self.ledger.transfer(token, recipient, router, amount) {
            Ok(()) => Err(DeliveryFailure::held(e.reason)),
            Err(reclaim) => {
                error!(
                    recipient = %short_hex(&recipient),
                    error = %reclaim,
                    "[ll-02] Hook failed after spending released funds"
                );
                Err(DeliveryFailure {
                    reason: e.reason,
                    released: true,
                })
            }
        }
    }
}

/// Why a claimed transfer did not reach its recipient.
struct DeliveryFailure {
    reason: String,
    /// Funds stayed with the recipient.
    released: bool,
}

impl DeliveryFailure {
    fn held(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            released: false,
        }
    }
}

#[async_trait]
impl LiquidityLayerRouterApi for LiquidityLayerRouter {
    async fn dispatch_with_tokens(
        &self,
        caller: Address,
        request: TransferRequest,
    ) -> Result<MessageId, RouterError> {
        // 1. Validate input
        if request.body.len() > self.config.max_body_len {
            return Err(RouterError::BodyTooLarge {
                len: request.body.len(),
                max: self.config.max_body_len,
            });
        }
        let adapter = self
            .adapter(request.adapter_type)
            .ok_or(RouterError::NoAdapterForType(request.adapter_type))?;
        let remote = self
            .remote_router(request.destination)
            .ok_or(RouterError::NoRouterEnrolled(request.destination))?;

        // 2. Adapter preconditions, before any funds move
        adapter.preflight(request.destination, request.token)?;

        // 3. Escrow
        self.ledger.transfer_from(
            request.token,
            self.config.address,
            caller,
            adapter.address(),
            request.amount,
        )?;

        // 4. Bridge
        let sent = adapter
            .send(SendRequest {
                sender: caller,
                destination: request.destination,
                token: request.token,
                amount: request.amount,
            })
            .await?;

        // 5. Dispatch
        let message = LiquidityLayerMessage::new(
            caller,
            request.recipient,
            request.adapter_type,
            &sent,
            request.token,
            request.amount,
            request.body,
        );
        let id = match self
            .transport
            .dispatch(
                self.config.address,
                request.destination,
                remote,
                message.encode()?,
            )
            .await
        {
            Ok(id) => id,
            Err(error) => {
                error!(
                    key = %sent.correlation_key,
                    error = %error,
                    "[ll-02] Funds bridged but message dispatch failed"
                );
                return Err(RouterError::DispatchFailed { sent, error });
            }
        };

        info!(
            id = %short_hex(&id),
            key = %sent.correlation_key,
            destination = request.destination,
            adapter = %request.adapter_type,
            amount = %request.amount,
            "[ll-02] Dispatched with tokens"
        );
        Ok(id)
    }

    async fn handle_message(
        &self,
        origin: Domain,
        sender: Address,
        body: &[u8],
    ) -> Result<DeliveredTransfer, RouterError> {
        // 1. Authenticate
        if self.remote_router(origin) != Some(sender) {
            warn!(
                origin,
                sender = %short_hex(&sender),
                "[ll-02] Message from unenrolled router"
            );
            return Err(RouterError::UnenrolledRouter { origin, sender });
        }

        // 2. Decode and verify
        let message = LiquidityLayerMessage::decode(body)?;
        let adapter = self
            .adapter(message.adapter_type)
            .ok_or(RouterError::NoAdapterForType(message.adapter_type))?;
        self.check_origin(&adapter, origin, &message)?;

        // 3. Claim
        let key = message.correlation_key;
        let amount = match adapter.claim(self.config.address, key) {
            Ok(amount) => amount,
            Err(e) => {
                if e.is_retryable() {
                    debug!(key = %key, "[ll-02] Funds not settled yet, deferring");
                }
                return Err(e.into());
            }
        };
        if amount != message.amount {
            warn!(
                key = %key,
                sent = %message.amount,
                settled = %amount,
                "[ll-02] Settled amount differs from sent amount"
            );
        }
        let token = adapter.token();

        // 4. Deliver
        if let Err(failure) = self.deliver(origin, &message, token, amount).await {
            self.escrow(UndeliveredTransfer {
                correlation_key: key,
                origin,
                original_sender: message.original_sender,
                recipient: message.recipient,
                token,
                amount,
                reason: failure.reason.clone(),
                released: failure.released,
            });
            return Err(RouterError::RecipientHookFailed {
                recipient: message.recipient,
                reason: failure.reason,
            });
        }

        info!(
            key = %key,
            origin,
            recipient = %short_hex(&message.recipient),
            %amount,
            "[ll-02] Transfer delivered"
        );
        Ok(DeliveredTransfer {
            correlation_key: key,
            recipient: message.recipient,
            token,
            amount,
            sent_amount: message.amount,
        })
    }
}
