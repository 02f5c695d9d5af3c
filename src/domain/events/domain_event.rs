//! # Domain Event Trait
//!
//! Base trait and shared metadata for all domain events.
//!
//! Domain events are immutable records of something that happened: a deal
//! transition, a posted message, a verified payment, a recorded settlement.
//! The notification/polling surface consumes them; emission failures never
//! affect the operation that produced the event.

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{DealId, EventId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Deal lifecycle events.
    Deal,
    /// Negotiation channel events.
    Negotiation,
    /// Payment events.
    Payment,
    /// Settlement and ledger events.
    Settlement,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deal => "DEAL",
            Self::Negotiation => "NEGOTIATION",
            Self::Payment => "PAYMENT",
            Self::Settlement => "SETTLEMENT",
        };
        write!(f, "{s}")
    }
}

/// Trait for all domain events.
pub trait DomainEvent: Send + Sync + fmt::Debug {
    /// Returns the unique identifier for this event.
    fn event_id(&self) -> EventId;

    /// Returns the deal this event relates to, if any.
    fn deal_id(&self) -> Option<DealId>;

    /// Returns when the event occurred.
    fn timestamp(&self) -> Timestamp;

    /// Returns the category of this event.
    fn event_type(&self) -> EventType;

    /// Returns the event's stable name.
    fn event_name(&self) -> &'static str;
}

/// Common metadata embedded in every concrete event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique identifier for this event.
    pub event_id: EventId,
    /// The deal this event relates to.
    pub deal_id: Option<DealId>,
    /// When the event occurred.
    pub timestamp: Timestamp,
}

impl EventMetadata {
    /// Creates metadata with a generated event id.
    #[must_use]
    pub fn new(deal_id: Option<DealId>) -> Self {
        Self {
            event_id: EventId::new_v4(),
            deal_id,
            timestamp: Timestamp::now(),
        }
    }

    /// Creates metadata scoped to a deal.
    #[must_use]
    pub fn for_deal(deal_id: DealId) -> Self {
        Self::new(Some(deal_id))
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new(None)
    }
}
