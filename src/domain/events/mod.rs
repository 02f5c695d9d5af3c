//! # Domain Events
//!
//! Immutable records of significant domain occurrences, consumed by the
//! notification surface. Every event embeds [`EventMetadata`] and implements
//! [`DomainEvent`].

pub mod deal_events;
pub mod domain_event;
pub mod negotiation_events;
pub mod settlement_events;

pub use deal_events::{DealCreated, DealStatusChanged};
pub use domain_event::{DomainEvent, EventMetadata, EventType};
pub use negotiation_events::{MessagePosted, ProposalAccepted};
pub use settlement_events::{PaymentVerified, SettlementRecorded};
