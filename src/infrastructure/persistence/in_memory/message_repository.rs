//! # In-Memory Message Repository
//!
//! Per-deal append-only channels backed by a thread-safe `HashMap`. The
//! insertion sequence is assigned under the channel's write lock, so
//! same-timestamp messages keep a stable order.

use crate::domain::entities::negotiation_message::NegotiationMessage;
use crate::domain::value_objects::{DealId, MessageId};
use crate::infrastructure::persistence::traits::{
    MessageRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`MessageRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageRepository {
    channels: Arc<RwLock<HashMap<DealId, Vec<NegotiationMessage>>>>,
}

impl InMemoryMessageRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: NegotiationMessage) -> RepositoryResult<NegotiationMessage> {
        let mut channels = self.channels.write().await;
        let channel = channels.entry(message.deal_id()).or_default();
        if channel.iter().any(|stored| stored.id() == message.id()) {
            return Err(RepositoryError::duplicate("NegotiationMessage", message.id()));
        }
        let mut message = message;
        let sequence = channel.len() as u64 + 1;
        message.assign_sequence(sequence);
        channel.push(message.clone());
        Ok(message)
    }

    async fn get(&self, id: MessageId) -> RepositoryResult<Option<NegotiationMessage>> {
        let channels = self.channels.read().await;
        Ok(channels
            .values()
            .flatten()
            .find(|message| message.id() == id)
            .cloned())
    }

    async fn list_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<NegotiationMessage>> {
        let channels = self.channels.read().await;
        let mut messages = channels.get(&deal_id).cloned().unwrap_or_default();
        messages.sort_by_key(|m| (m.created_at(), m.sequence()));
        Ok(messages)
    }

    async fn save(&self, message: &NegotiationMessage) -> RepositoryResult<()> {
        let mut channels = self.channels.write().await;
        let channel = channels
            .get_mut(&message.deal_id())
            .ok_or_else(|| RepositoryError::not_found("NegotiationMessage", message.id()))?;
        let stored = channel
            .iter_mut()
            .find(|stored| stored.id() == message.id())
            .ok_or_else(|| RepositoryError::not_found("NegotiationMessage", message.id()))?;
        *stored = message.clone();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Actor, ClientId, TraderId};

    fn text_message(deal_id: DealId, content: &str) -> NegotiationMessage {
        NegotiationMessage::text(deal_id, Actor::Client(ClientId::new_v4()), content).unwrap()
    }

    #[tokio::test]
    async fn append_assigns_monotone_sequences() {
        let repo = InMemoryMessageRepository::new();
        let deal_id = DealId::new_v4();

        let first = repo.append(text_message(deal_id, "one")).await.unwrap();
        let second = repo.append(text_message(deal_id, "two")).await.unwrap();
        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);

        // A different deal's channel counts on its own.
        let other = repo
            .append(text_message(DealId::new_v4(), "elsewhere"))
            .await
            .unwrap();
        assert_eq!(other.sequence(), 1);
    }

    #[tokio::test]
    async fn listing_orders_by_time_then_sequence() {
        let repo = InMemoryMessageRepository::new();
        let deal_id = DealId::new_v4();
        for content in ["a", "b", "c"] {
            repo.append(
                NegotiationMessage::text(deal_id, Actor::Trader(TraderId::new_v4()), content)
                    .unwrap(),
            )
            .await
            .unwrap();
        }
        let listed = repo.list_for_deal(deal_id).await.unwrap();
        let contents: Vec<_> = listed.iter().map(|m| m.content().unwrap()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn save_persists_read_marker() {
        let repo = InMemoryMessageRepository::new();
        let deal_id = DealId::new_v4();
        let mut message = repo.append(text_message(deal_id, "hello")).await.unwrap();

        message.mark_read();
        repo.save(&message).await.unwrap();

        let reloaded = repo.get(message.id()).await.unwrap().unwrap();
        assert!(reloaded.is_read());
    }

    #[tokio::test]
    async fn save_unknown_message_fails() {
        let repo = InMemoryMessageRepository::new();
        let message = text_message(DealId::new_v4(), "never appended");
        let result = repo.save(&message).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn empty_channel_lists_empty() {
        let repo = InMemoryMessageRepository::new();
        assert!(repo.list_for_deal(DealId::new_v4()).await.unwrap().is_empty());
    }
}
