//! Error types for the liquidity layer router.

use ll_01_bridge_adapters::{BridgeAdapterError, BridgeAdapterType, CorrelationKey, SentTransfer};
use shared_transport::{DeliveryError, TransportError};
use shared_types::{Address, Domain, LedgerError};
use thiserror::Error;

/// Failure reported by a recipient hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RecipientError {
    /// Human-readable reason.
    pub reason: String,
}

impl RecipientError {
    /// Create an error with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Router errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No adapter of the requested type is registered on this chain.
    #[error("No {0} adapter registered")]
    NoAdapterForType(BridgeAdapterType),

    /// No remote router is enrolled for the destination.
    #[error("No router enrolled for domain {0}")]
    NoRouterEnrolled(Domain),

    /// Message came from something other than the enrolled router.
    #[error("Sender {sender:?} is not the enrolled router for domain {origin}")]
    UnenrolledRouter {
        /// Origin domain.
        origin: Domain,
        /// Claimed sender.
        sender: Address,
    },

    /// Body could not be decoded.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Envelope version is not understood.
    #[error("Unsupported envelope version {0}")]
    UnsupportedEnvelopeVersion(u8),

    /// Envelope key does not match the key derived locally.
    #[error("Correlation key mismatch: {0}")]
    CorrelationMismatch(CorrelationKey),

    /// Recipient refused the transfer; funds are escrowed.
    #[error("Recipient {recipient:?} failed: {reason}")]
    RecipientHookFailed {
        /// Recipient.
        recipient: Address,
        /// Reason given by the hook.
        reason: String,
    },

    /// Nothing is escrowed under the key.
    #[error("No undelivered transfer for {0}")]
    NoUndeliveredTransfer(CorrelationKey),

    /// Caller is not the router owner.
    #[error("Unauthorized caller {0:?}")]
    Unauthorized(Address),

    /// Body exceeds the configured limit.
    #[error("Body of {len} bytes exceeds limit of {max}")]
    BodyTooLarge {
        /// Body length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Funds left on the vendor bridge but the message was never dispatched.
    ///
    /// `sent` identifies the settlement an operator must recover.
    #[error("Funds bridged under {} but dispatch failed: {error}", .sent.correlation_key)]
    DispatchFailed {
        /// The bridged transfer.
        sent: SentTransfer,
        /// Transport failure.
        error: TransportError,
    },

    /// Envelope could not be encoded.
    #[error("Envelope encoding failed: {0}")]
    Encoding(String),

    /// Bridge adapter failure.
    #[error(transparent)]
    Adapter(#[from] BridgeAdapterError),

    /// Token ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RouterError {
    /// Whether presenting the same message later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Adapter(e) => e.is_retryable(),
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<RouterError> for DeliveryError {
    fn from(err: RouterError) -> Self {
        if err.is_retryable() {
            DeliveryError::Retryable(err.to_string())
        } else {
            DeliveryError::Rejected(err.to_string())
        }
    }
}
