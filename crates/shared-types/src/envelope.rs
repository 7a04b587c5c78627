//! # `InterchainMessage` Envelope
//!
//! The unit carried by the message transport between two mailboxes.
//!
//! ## Properties
//!
//! - **Versioning**: every message carries `version` for forward compatibility.
//! - **Identity**: the message id is the Keccak-256 of the canonical encoding,
//!   so both chains compute the same id without coordination.
//! - **Ordering**: `nonce` is the origin mailbox's dispatch counter.

use crate::entities::{keccak256, Address, Domain, MessageId};
use serde::{Deserialize, Serialize};

/// A message dispatched through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchainMessage {
    /// Protocol version.
    pub version: u8,
    /// Per-origin-mailbox dispatch counter.
    pub nonce: u32,
    /// Domain of the chain the message was dispatched from.
    pub origin: Domain,
    /// Contract that called `dispatch` on the origin chain.
    pub sender: Address,
    /// Domain of the chain the message is addressed to.
    pub destination: Domain,
    /// Contract that will be handed the body on the destination chain.
    pub recipient: Address,
    /// Opaque application payload.
    pub body: Vec<u8>,
}

impl InterchainMessage {
    /// Current protocol version.
    pub const CURRENT_VERSION: u8 = 0;

    /// Canonical packed encoding used for hashing.
    ///
    /// Layout: `version(1) | nonce(4) | origin(4) | sender(32) | destination(4) | recipient(32) | body`.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(77 + self.body.len());
        out.push(self.version);
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.origin.to_be_bytes());
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&self.destination.to_be_bytes());
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Message id: Keccak-256 of [`Self::to_packed`].
    #[must_use]
    pub fn id(&self) -> MessageId {
        keccak256(&self.to_packed())
    }
}
