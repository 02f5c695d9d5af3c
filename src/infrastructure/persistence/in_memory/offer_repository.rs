//! # In-Memory Offer Repository
//!
//! Catalog stand-in for tests. The core only reads offers; `seed` exists so
//! fixtures can publish them.

use crate::domain::entities::offer::Offer;
use crate::domain::value_objects::OfferId;
use crate::infrastructure::persistence::traits::{OfferRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`OfferRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryOfferRepository {
    storage: Arc<RwLock<HashMap<OfferId, Offer>>>,
}

impl InMemoryOfferRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes an offer into the catalog stand-in.
    pub async fn seed(&self, offer: Offer) {
        self.storage.write().await.insert(offer.id, offer);
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn get(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        Ok(self.storage.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::offer::OfferStatus;
    use crate::domain::value_objects::TraderId;

    #[tokio::test]
    async fn seed_and_get() {
        let repo = InMemoryOfferRepository::new();
        let offer = Offer {
            id: OfferId::new_v4(),
            trader_id: TraderId::new_v4(),
            status: OfferStatus::Published,
            items: vec![],
        };
        repo.seed(offer.clone()).await;
        assert_eq!(repo.get(offer.id).await.unwrap().unwrap(), offer);
        assert!(repo.get(OfferId::new_v4()).await.unwrap().is_none());
    }
}
