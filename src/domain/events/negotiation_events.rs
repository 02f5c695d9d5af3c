//! # Negotiation Channel Events
//!
//! Events for posted messages and accepted proposals. The notification
//! surface consumes `MessagePosted` ("new negotiation message"); delivery
//! and polling are out of scope here.

use crate::domain::events::domain_event::{DomainEvent, EventMetadata, EventType};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{Actor, DealId, EventId, MessageId, MessageKind, Money};
use serde::{Deserialize, Serialize};

/// Event emitted when a message is appended to a deal's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePosted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The appended message.
    pub message_id: MessageId,
    /// Who posted it.
    pub sender: Actor,
    /// Text or price proposal.
    pub kind: MessageKind,
}

impl MessagePosted {
    /// Creates a new `MessagePosted` event.
    #[must_use]
    pub fn new(deal_id: DealId, message_id: MessageId, sender: Actor, kind: MessageKind) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            message_id,
            sender,
            kind,
        }
    }
}

impl DomainEvent for MessagePosted {
    fn event_id(&self) -> EventId {
        self.metadata.event_id
    }

    fn deal_id(&self) -> Option<DealId> {
        self.metadata.deal_id
    }

    fn timestamp(&self) -> Timestamp {
        self.metadata.timestamp
    }

    fn event_type(&self) -> EventType {
        EventType::Negotiation
    }

    fn event_name(&self) -> &'static str {
        "MessagePosted"
    }
}

/// Event emitted when a price proposal is accepted into the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAccepted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The accepted proposal message.
    pub message_id: MessageId,
    /// Who accepted it.
    pub accepted_by: Actor,
    /// The price copied into the deal.
    pub price: Money,
}

impl ProposalAccepted {
    /// Creates a new `ProposalAccepted` event.
    #[must_use]
    pub fn new(deal_id: DealId, message_id: MessageId, accepted_by: Actor, price: Money) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            message_id,
            accepted_by,
            price,
        }
    }
}

impl DomainEvent for ProposalAccepted {
    fn event_id(&self) -> EventId {
        self.metadata.event_id
    }

    fn deal_id(&self) -> Option<DealId> {
        self.metadata.deal_id
    }

    fn timestamp(&self) -> Timestamp {
        self.metadata.timestamp
    }

    fn event_type(&self) -> EventType {
        EventType::Negotiation
    }

    fn event_name(&self) -> &'static str {
        "ProposalAccepted"
    }
}
