//! # In-Memory Event Store
//!
//! Append-only event feed for tests and in-process notification polling.

use crate::domain::value_objects::DealId;
use crate::infrastructure::persistence::event_store::{
    EventStore, EventStoreResult, StoredEvent,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`EventStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored event in append order.
    pub async fn all_events(&self) -> Vec<StoredEvent> {
        self.events.read().await.clone()
    }

    /// Returns the events with the given name, in append order.
    pub async fn events_named(&self, name: &str) -> Vec<StoredEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|event| event.event_name == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: StoredEvent) -> EventStoreResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn events_for_deal(&self, deal_id: DealId) -> EventStoreResult<Vec<StoredEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.deal_id == Some(deal_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::events::deal_events::DealStatusChanged;
    use crate::domain::value_objects::DealStatus;

    #[tokio::test]
    async fn append_and_filter_by_deal() {
        let store = InMemoryEventStore::new();
        let deal_id = DealId::new_v4();
        let event = DealStatusChanged::new(
            deal_id,
            DealStatus::Negotiation,
            DealStatus::Approved,
            None,
        );
        store
            .append(StoredEvent::from_event(&event).unwrap())
            .await
            .unwrap();

        let for_deal = store.events_for_deal(deal_id).await.unwrap();
        assert_eq!(for_deal.len(), 1);
        assert_eq!(for_deal.first().unwrap().event_name, "DealStatusChanged");
        assert!(
            store
                .events_for_deal(DealId::new_v4())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
