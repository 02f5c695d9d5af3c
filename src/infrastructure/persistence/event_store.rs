//! # Event Store Port
//!
//! Append-only storage for domain events.
//!
//! The notification surface polls this feed for "new negotiation message"
//! and "deal status changed" events; delivery itself is out of scope.
//! Appends are best-effort from the caller's perspective: services log a
//! failed append and keep going, like audit emission.

use crate::domain::events::domain_event::{DomainEvent, EventType};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{DealId, EventId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A serialized domain event ready for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// The event's unique id.
    pub event_id: EventId,
    /// The deal the event relates to, if any.
    pub deal_id: Option<DealId>,
    /// Event category.
    pub event_type: EventType,
    /// Stable event name.
    pub event_name: String,
    /// When the event occurred.
    pub timestamp: Timestamp,
    /// JSON payload of the concrete event.
    pub payload: serde_json::Value,
}

impl StoredEvent {
    /// Serializes a concrete event for storage.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Serialization`] if the payload cannot be
    /// encoded.
    pub fn from_event<E>(event: &E) -> EventStoreResult<Self>
    where
        E: DomainEvent + Serialize,
    {
        let payload = serde_json::to_value(event)
            .map_err(|e| EventStoreError::Serialization(e.to_string()))?;
        Ok(Self {
            event_id: event.event_id(),
            deal_id: event.deal_id(),
            event_type: event.event_type(),
            event_name: event.event_name().to_string(),
            timestamp: event.timestamp(),
            payload,
        })
    }
}

impl fmt::Display for StoredEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.event_name, self.event_type, self.event_id)
    }
}

/// Error type for event store operations.
#[derive(Debug, Clone, Error)]
pub enum EventStoreError {
    /// The payload could not be serialized.
    #[error("event serialization failed: {0}")]
    Serialization(String),

    /// The backend rejected the append.
    #[error("event store failure: {0}")]
    Storage(String),
}

/// Result type for event store operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Append-only domain event storage.
#[async_trait]
pub trait EventStore: Send + Sync + fmt::Debug {
    /// Appends one event.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Storage`] when the backend cannot take
    /// the event.
    async fn append(&self, event: StoredEvent) -> EventStoreResult<()>;

    /// Lists a deal's events in append order.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Storage`] on backend failure.
    async fn events_for_deal(&self, deal_id: DealId) -> EventStoreResult<Vec<StoredEvent>>;
}
