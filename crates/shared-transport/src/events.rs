//! # Transport Events
//!
//! Lifecycle events published by mailboxes and the relayer.
//!
//! Events are observational only: nothing in the delivery path depends on a
//! subscriber being present.

use serde::{Deserialize, Serialize};
use shared_types::{Domain, MessageId};

/// Everything that can happen to a message in transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// A message was accepted by its origin mailbox.
    Dispatched {
        /// Message id.
        id: MessageId,
        /// Origin domain.
        origin: Domain,
        /// Destination domain.
        destination: Domain,
    },

    /// A message was handed to its recipient and accepted.
    Processed {
        /// Message id.
        id: MessageId,
        /// Origin domain.
        origin: Domain,
        /// Destination domain.
        destination: Domain,
    },

    /// The recipient asked for the message to be presented again later.
    DeliveryDeferred {
        /// Message id.
        id: MessageId,
        /// Delivery attempts so far.
        attempts: u32,
        /// Recipient-supplied reason.
        reason: String,
    },

    /// The retry budget ran out; the message waits until its recipient is ready.
    DeliveryParked {
        /// Message id.
        id: MessageId,
        /// Delivery attempts made.
        attempts: u32,
    },

    /// The message will never be delivered automatically.
    DeadLettered {
        /// Message id.
        id: MessageId,
        /// Why delivery was abandoned.
        reason: String,
    },
}

/// Coarse classification used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// `Dispatched`.
    Dispatch,
    /// `Processed`.
    Process,
    /// `DeliveryDeferred` and `DeliveryParked`.
    Retry,
    /// `DeadLettered`.
    DeadLetter,
}

impl TransportEvent {
    /// Topic of this event.
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Dispatched { .. } => EventTopic::Dispatch,
            Self::Processed { .. } => EventTopic::Process,
            Self::DeliveryDeferred { .. } | Self::DeliveryParked { .. } => EventTopic::Retry,
            Self::DeadLettered { .. } => EventTopic::DeadLetter,
        }
    }

    /// Id of the message this event is about.
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Dispatched { id, .. }
            | Self::Processed { id, .. }
            | Self::DeliveryDeferred { id, .. }
            | Self::DeliveryParked { id, .. }
            | Self::DeadLettered { id, .. } => *id,
        }
    }
}

/// Subscription filter.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to receive. Empty means all.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Receive every event.
    #[must_use]
    pub fn all() -> Self {
        Self { topics: Vec::new() }
    }

    /// Receive only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &TransportEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::H256;

    #[test]
    fn test_filter_all_matches_everything() {
        let event = TransportEvent::DeadLettered {
            id: H256::zero(),
            reason: "x".into(),
        };
        assert!(EventFilter::all().matches(&event));
    }

    #[test]
    fn test_filter_topics() {
        let filter = EventFilter::topics(vec![EventTopic::Process]);
        let processed = TransportEvent::Processed {
            id: H256::zero(),
            origin: 1,
            destination: 2,
        };
        let deferred = TransportEvent::DeliveryDeferred {
            id: H256::zero(),
            attempts: 1,
            reason: "not settled".into(),
        };
        assert!(filter.matches(&processed));
        assert!(!filter.matches(&deferred));
    }
}
