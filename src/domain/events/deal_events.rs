//! # Deal Lifecycle Events
//!
//! Events emitted by deal creation and status transitions. The
//! notification surface consumes `DealStatusChanged` to tell the parties
//! their deal moved.

use crate::domain::events::domain_event::{DomainEvent, EventMetadata, EventType};
use crate::domain::value_objects::deal_status::DealStatus;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Actor, ClientId, DealId, DealNumber, EmployeeId, EventId, TraderId,
};
use serde::{Deserialize, Serialize};

/// Event emitted when a deal is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealCreated {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The assigned deal number.
    pub deal_number: DealNumber,
    /// The buying client.
    pub client_id: ClientId,
    /// The selling trader.
    pub trader_id: TraderId,
    /// The assigned mediating employee.
    pub employee_id: EmployeeId,
    /// Who created the deal.
    pub created_by: Actor,
}

impl DealCreated {
    /// Creates a new `DealCreated` event.
    #[must_use]
    pub fn new(
        deal_id: DealId,
        deal_number: DealNumber,
        client_id: ClientId,
        trader_id: TraderId,
        employee_id: EmployeeId,
        created_by: Actor,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            deal_number,
            client_id,
            trader_id,
            employee_id,
            created_by,
        }
    }
}

impl DomainEvent for DealCreated {
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
        EventType::Deal
    }

    fn event_name(&self) -> &'static str {
        "DealCreated"
    }
}

/// Event emitted when a deal's status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealStatusChanged {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Status before the transition.
    pub from: DealStatus,
    /// Status after the transition.
    pub to: DealStatus,
    /// Who caused the transition, when a single actor did.
    pub actor: Option<Actor>,
}

impl DealStatusChanged {
    /// Creates a new `DealStatusChanged` event.
    #[must_use]
    pub fn new(deal_id: DealId, from: DealStatus, to: DealStatus, actor: Option<Actor>) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            from,
            to,
            actor,
        }
    }
}

impl DomainEvent for DealStatusChanged {
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
        EventType::Deal
    }

    fn event_name(&self) -> &'static str {
        "DealStatusChanged"
    }
}
