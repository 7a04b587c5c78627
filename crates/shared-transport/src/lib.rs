//! # Shared Transport - Interchain Message Transport
//!
//! The base messaging layer the liquidity layer rides on: one mailbox per
//! chain, plus a relayer that carries messages between them.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  dispatch()  ┌──────────┐                 ┌──────────┐  handle()  ┌───────────┐
//! │  App (A)     │ ───────────▶ │ Mailbox A│ ──┐         ┌─▶ │ Mailbox B│ ─────────▶ │  App (B)  │
//! └──────────────┘              └──────────┘   │         │   └──────────┘            └───────────┘
//!                                              ▼         │
//!                                       ┌─────────────────────┐
//!                                       │  MailboxNetwork     │
//!                                       │  (relay + retry)    │
//!                                       └─────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Exactly-once delivery:** a mailbox seals a message id after the first
//!   successful `handle` and refuses every later presentation.
//! - **Retry on request:** a `Retryable` failure keeps the message pending for
//!   the next relay pass.
//! - **Dead Letter Queue:** rejected messages are kept for investigation.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod delivery_cache;
pub mod events;
pub mod mailbox;
pub mod relayer;
pub mod subscriber;

// Re-export main types
pub use delivery_cache::{DeliveryCache, DeliveryCacheError};
pub use events::{EventFilter, EventTopic, TransportEvent};
pub use mailbox::{
    DeliveryError, InMemoryMailbox, MessageRecipient, MessageTransport, TransportError,
};
pub use relayer::{DeadLetter, MailboxNetwork, PendingMessage, ProcessReport, RelayerConfig};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before old ones are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
