//! # Payment and Settlement Events
//!
//! Events emitted by payment verification and by a completed settlement's
//! ledger write.

use crate::domain::events::domain_event::{DomainEvent, EventMetadata, EventType};
use crate::domain::services::settlement::SettlementSplit;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{Actor, DealId, EventId, Money, PaymentId};
use serde::{Deserialize, Serialize};

/// Event emitted when an employee or admin verifies a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerified {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The verified payment.
    pub payment_id: PaymentId,
    /// Who verified it.
    pub verified_by: Actor,
    /// The verified amount.
    pub amount: Money,
}

impl PaymentVerified {
    /// Creates a new `PaymentVerified` event.
    #[must_use]
    pub fn new(deal_id: DealId, payment_id: PaymentId, verified_by: Actor, amount: Money) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            payment_id,
            verified_by,
            amount,
        }
    }
}

impl DomainEvent for PaymentVerified {
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
        EventType::Payment
    }

    fn event_name(&self) -> &'static str {
        "PaymentVerified"
    }
}

/// Event emitted once a settlement's full ledger entry set is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecorded {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The settled amount.
    pub amount: Money,
    /// The computed split.
    pub split: SettlementSplit,
    /// How many ledger entries the settlement produced.
    pub entry_count: usize,
}

impl SettlementRecorded {
    /// Creates a new `SettlementRecorded` event.
    #[must_use]
    pub fn new(deal_id: DealId, amount: Money, split: SettlementSplit, entry_count: usize) -> Self {
        Self {
            metadata: EventMetadata::for_deal(deal_id),
            amount,
            split,
            entry_count,
        }
    }
}

impl DomainEvent for SettlementRecorded {
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
        EventType::Settlement
    }

    fn event_name(&self) -> &'static str {
        "SettlementRecorded"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::EmployeeId;

    #[test]
    fn payment_verified_event() {
        let event = PaymentVerified::new(
            DealId::new_v4(),
            PaymentId::new_v4(),
            Actor::Employee(EmployeeId::new_v4()),
            Money::new(50_000_00, 2).unwrap(),
        );
        assert_eq!(event.event_type(), EventType::Payment);
        assert_eq!(event.event_name(), "PaymentVerified");
    }

    #[test]
    fn settlement_recorded_event() {
        let split = SettlementSplit {
            platform_commission: Money::new(1250_00, 2).unwrap(),
            employee_commission: Money::new(500_00, 2).unwrap(),
            shipping_commission: Money::ZERO,
            trader_amount: Money::new(48_250_00, 2).unwrap(),
        };
        let event = SettlementRecorded::new(
            DealId::new_v4(),
            Money::new(50_000_00, 2).unwrap(),
            split,
            4,
        );
        assert_eq!(event.entry_count, 4);
        assert_eq!(event.event_type(), EventType::Settlement);
    }
}
